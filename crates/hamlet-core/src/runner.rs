//! The tick loop.
//!
//! [`run_ticks`] keeps calling [`Simulation::step`] until the simulation
//! reports a cap or the operator asks to stop. The stop flag is read only
//! between ticks, so a cycle is never cut short.

use std::time::Duration;

use hamlet_oracle::Oracle;
use tracing::{info, warn};

use crate::operator::{OperatorState, SimulationEndReason};
use crate::state::SimulationState;
use crate::tick::{Simulation, TickError, TickStep, TickSummary};

/// Errors that end a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick could not complete.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Caps for one call to [`run_ticks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    /// Stop once this many ticks have run.
    pub max_ticks: u64,
    /// Pause between ticks; the operator may change it while running.
    pub tick_interval: Duration,
    /// Stop once this many conversations were produced, if set.
    pub max_conversations: Option<u64>,
}

/// How a run went.
#[derive(Debug)]
pub struct SimulationResult {
    /// Why the run stopped.
    pub end_reason: SimulationEndReason,
    /// Ticks run by this call.
    pub total_ticks: u64,
    /// Summary of the last tick, if one ran.
    pub final_summary: Option<TickSummary>,
    /// State snapshot at the end of the run.
    pub state: SimulationState,
}

/// Observer called after every tick.
pub trait TickCallback: Send {
    /// A tick just finished.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// Ignores every tick.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run ticks until a cap is hit or a stop is requested.
///
/// `limits` replaces the simulation's caps and the operator's pace before
/// the first tick.
pub async fn run_ticks<O: Oracle>(
    simulation: &mut Simulation<O>,
    limits: RunLimits,
    operator: &OperatorState,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    simulation.set_limits(limits.max_ticks, limits.max_conversations);
    operator.set_tick_interval(limits.tick_interval);

    info!(
        agents = simulation.roster().len(),
        max_ticks = limits.max_ticks,
        max_conversations = ?limits.max_conversations,
        tick_interval_ms = operator.tick_interval_ms(),
        "Run starting"
    );

    let mut ran: u64 = 0;
    let mut last: Option<TickSummary> = None;
    let end_reason = loop {
        if operator.is_stop_requested() {
            info!(ticks = ran, "Stop requested; ending run");
            break SimulationEndReason::OperatorStop;
        }
        let summary = match Box::pin(simulation.step()).await? {
            TickStep::Ran(summary) => summary,
            TickStep::Finished(reason) => break reason,
        };
        ran = ran.saturating_add(1);
        callback.on_tick(&summary, simulation.state());
        last = Some(summary);

        let pause = operator.tick_interval();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    };

    Ok(SimulationResult {
        end_reason,
        total_ticks: ran,
        final_summary: last,
        state: simulation.current_state(),
    })
}

/// Log how a run ended.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = %result.end_reason,
        ticks = result.total_ticks,
        conversations = result.state.conversation_count,
        day = result.state.day,
        "Run ended"
    );
    match &result.final_summary {
        Some(last) => info!(
            tick = last.tick,
            day = last.day,
            hour = last.hour,
            acted = last.acted.len(),
            failed = last.failed.len(),
            "Last tick"
        ),
        None => warn!("Run ended before any tick ran"),
    }
}
