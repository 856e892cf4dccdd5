//! Driver binary for the Hamlet simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hamlet-config.yaml` (or `--config`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the entity store and run migrations; `--fresh` clears history
//! 4. Load the agent roster and register every profile; only loaded
//!    profiles act, even if the store remembers others
//! 5. Build the oracle backend and prompt templates
//! 6. Wire Ctrl-C to the operator stop flag
//! 7. Run ticks until a cap is reached or a stop is requested
//! 8. Log conversation statistics and the end reason

mod error;
mod tick_logger;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use hamlet_core::config::{LogFormat, LoggingConfig};
use hamlet_core::roster::load_roster;
use hamlet_core::runner::log_simulation_end;
use hamlet_core::{HamletConfig, OperatorState, RunLimits, Simulation, run_ticks};
use hamlet_oracle::{OracleAdapter, OracleSettings, PromptEngine, create_backend};
use hamlet_store::{Database, StoreConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::tick_logger::TickLogger;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "hamlet-engine", about = "Run the Hamlet community simulation")]
struct Args {
    /// Path of the YAML configuration file.
    #[arg(long, default_value = "hamlet-config.yaml")]
    config: PathBuf,

    /// Delete stored memories, conversations and plans before the run.
    #[arg(long)]
    fresh: bool,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step or the run itself fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let args = Args::parse();

    // 1-2. Configuration first, so the log level can come from it.
    let loaded = HamletConfig::load(&args.config);
    let default_logging = LoggingConfig::default();
    init_logging(loaded.as_ref().map_or(&default_logging, |c| &c.logging));
    let config = loaded?;
    info!(
        config = %args.config.display(),
        backend = ?config.oracle.backend,
        max_ticks = config.simulation.max_ticks,
        max_conversations = ?config.simulation.max_conversations,
        seed = config.simulation.seed,
        "Configuration loaded"
    );

    // 3. Entity store.
    let store_config =
        StoreConfig::new(&config.store.database_path).with_retention(config.retention.policy());
    let db = Database::connect(&store_config).await?;
    db.run_migrations().await?;
    if args.fresh {
        db.clear_history().await?;
        info!("History cleared");
    }

    // 4. Roster.
    let roster = load_roster(&config.agents.roster_dir)?;
    for profile in &roster {
        db.agents().register(profile).await?;
    }
    info!(
        agents = roster.len(),
        roster_dir = %config.agents.roster_dir.display(),
        "Roster registered"
    );

    // 5. Oracle.
    let backend = create_backend(&config.oracle)?;
    let prompts = PromptEngine::new(config.oracle.templates_dir.as_deref())?;
    let oracle = OracleAdapter::new(backend, prompts, OracleSettings::from(&config.oracle));

    let limits = RunLimits {
        max_ticks: config.simulation.max_ticks,
        tick_interval: Duration::from_millis(config.simulation.tick_interval_ms),
        max_conversations: config.simulation.max_conversations,
    };
    let active: Vec<_> = roster.iter().map(|p| p.id.clone()).collect();
    let mut simulation = Box::pin(Simulation::with_agents(db.clone(), oracle, config, &active)).await?;

    // 6. Operator controls.
    let operator = Arc::new(OperatorState::new(
        u64::try_from(limits.tick_interval.as_millis()).unwrap_or(u64::MAX),
    ));
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received; stopping after the current tick");
                    operator.request_stop();
                }
                Err(err) => warn!(error = %err, "Could not listen for Ctrl-C"),
            }
        });
    }

    // 7. Run.
    let mut logger = TickLogger::new();
    let result = Box::pin(run_ticks(&mut simulation, limits, &operator, &mut logger)).await?;

    // 8. Report.
    match db.conversations().stats().await {
        Ok(stats) => info!(
            total = stats.total,
            by_kind = ?stats.by_kind,
            by_agent = ?stats.by_agent,
            chatty_ticks = logger.chatty_ticks(),
            "Conversation statistics"
        ),
        Err(err) => warn!(error = %err, "Conversation statistics unavailable"),
    }
    log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        elapsed_seconds = operator.elapsed_seconds(),
        "hamlet-engine shutdown complete"
    );

    db.close().await;
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_project_config() {
        let args = Args::try_parse_from(["hamlet-engine"]).unwrap();
        assert_eq!(args.config, PathBuf::from("hamlet-config.yaml"));
        assert!(!args.fresh);
    }

    #[test]
    fn accepts_config_and_fresh() {
        let args =
            Args::try_parse_from(["hamlet-engine", "--config", "run.yaml", "--fresh"]).unwrap();
        assert_eq!(args.config, PathBuf::from("run.yaml"));
        assert!(args.fresh);
    }

    #[test]
    fn logger_counts_ticks_with_conversations() {
        use hamlet_core::clock::SimClock;
        use hamlet_core::{SimulationState, TickCallback, TickSummary};

        let config = HamletConfig::default();
        let reading = SimClock::new(&config.clock).reading(0);
        let state = SimulationState::new(&[], &config.runtime, reading, 1, None);
        let mut summary = TickSummary {
            tick: 0,
            day: reading.day,
            hour: reading.hour,
            time_of_day: reading.time_of_day,
            acted: Vec::new(),
            failed: Vec::new(),
            conversations: 0,
            conversation_count: 0,
            global_event: None,
        };
        let mut logger = TickLogger::new();
        logger.on_tick(&summary, &state);
        summary.conversations = 2;
        logger.on_tick(&summary, &state);
        assert_eq!(logger.chatty_ticks(), 1);
    }
}
