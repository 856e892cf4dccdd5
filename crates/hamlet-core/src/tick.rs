//! The scheduler: one [`Simulation::step`] per tick.
//!
//! Each tick:
//!
//! 1. **Terminate?** -- stop when the conversation cap or the tick cap is
//!    reached, before any agent runs.
//! 2. **Clock** -- read the hour for this tick; on day rollover run the
//!    daily review for the day just finished.
//! 3. **Select** -- active-hours agents in id order (everyone when nobody
//!    is awake), or one oracle-chosen agent.
//! 4. **Cycle** -- run each selected agent's cycle in order, re-checking
//!    the conversation cap before each one. A failed cycle is logged and
//!    the tick continues.
//! 5. **Advance** -- bump the tick counter, then every
//!    `global_event_interval` ticks ask for an optional community event.
//!
//! Agents run one at a time; a cycle's store writes are committed before
//! the next cycle starts.

use chrono::Utc;
use hamlet_oracle::{Oracle, OracleAdapter};
use hamlet_store::{ConversationQuery, Database, StoreError};
use hamlet_types::{AgentId, AgentProfile, TimeOfDay};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::clock::SimClock;
use crate::config::HamletConfig;
use crate::context::narrator_context;
use crate::cycle::{CycleEnv, run_cycle};
use crate::decision::{Dice, SelectionPolicy};
use crate::operator::SimulationEndReason;
use crate::review::run_daily_review;
use crate::state::SimulationState;

/// Recent community messages shown to the global-event prompt.
const EVENT_CONTEXT_MESSAGES: u32 = 5;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// Loading the roster or plans failed while building the simulation.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// The tick counter would overflow.
    #[error("tick counter overflow")]
    Overflow,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSummary {
    /// The tick that ran (0-based).
    pub tick: u64,
    /// Day of the tick.
    pub day: u64,
    /// Hour of the tick.
    pub hour: u8,
    /// Label for the hour.
    pub time_of_day: TimeOfDay,
    /// Agents whose cycle completed, in run order.
    pub acted: Vec<AgentId>,
    /// Agents whose cycle failed on a store error.
    pub failed: Vec<AgentId>,
    /// Conversations produced this tick.
    pub conversations: u64,
    /// Conversations produced this run so far.
    pub conversation_count: u64,
    /// Community event announced for the next tick, if any.
    pub global_event: Option<String>,
}

/// Result of [`Simulation::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum TickStep {
    /// A tick ran.
    Ran(TickSummary),
    /// A cap was already reached; nothing ran.
    Finished(SimulationEndReason),
}

/// The store, the oracle, the roster, and the owned simulation state.
pub struct Simulation<O> {
    db: Database,
    oracle: OracleAdapter<O>,
    config: HamletConfig,
    roster: Vec<AgentProfile>,
    clock: SimClock,
    dice: Dice,
    state: SimulationState,
}

impl<O: Oracle> Simulation<O> {
    /// Build a simulation over every agent registered in `db`, in
    /// registration order. Each agent's current plan is loaded into its
    /// runtime state. Counters start at zero.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Store`] if the roster or plans cannot be read.
    pub async fn new(
        db: Database,
        oracle: OracleAdapter<O>,
        config: HamletConfig,
    ) -> Result<Self, TickError> {
        let roster = db.agents().list().await?;
        Self::build(db, oracle, config, roster).await
    }

    /// Like [`new`](Self::new), but only the registered agents named in
    /// `only` take part. Agents left in a persisted store whose profiles
    /// are no longer loaded keep their history and never act.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Store`] if the roster or plans cannot be read.
    pub async fn with_agents(
        db: Database,
        oracle: OracleAdapter<O>,
        config: HamletConfig,
        only: &[AgentId],
    ) -> Result<Self, TickError> {
        let mut roster = db.agents().list().await?;
        let registered = roster.len();
        roster.retain(|p| only.contains(&p.id));
        if roster.len() < registered {
            info!(
                inactive = registered.saturating_sub(roster.len()),
                "Stored agents without a loaded profile will not act"
            );
        }
        Self::build(db, oracle, config, roster).await
    }

    async fn build(
        db: Database,
        oracle: OracleAdapter<O>,
        config: HamletConfig,
        roster: Vec<AgentProfile>,
    ) -> Result<Self, TickError> {
        let clock = SimClock::new(&config.clock);
        let mut state = SimulationState::new(
            &roster,
            &config.runtime,
            clock.reading(0),
            config.simulation.max_ticks,
            config.simulation.max_conversations,
        );
        for profile in &roster {
            let plan = db.plans().current(&profile.id).await?;
            if let (Some(plan), Some(runtime)) = (plan, state.agent_states.get_mut(&profile.id)) {
                runtime.current_plan = Some(plan);
            }
        }
        let dice = Dice::new(config.simulation.seed);
        info!(
            agents = roster.len(),
            seed = config.simulation.seed,
            clock = ?clock.mode(),
            "Simulation ready"
        );
        Ok(Self {
            db,
            oracle,
            config,
            roster,
            clock,
            dice,
            state,
        })
    }

    /// The live state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// A snapshot of the current state.
    pub fn current_state(&self) -> SimulationState {
        self.state.clone()
    }

    /// Registered agents in registration order.
    pub fn roster(&self) -> &[AgentProfile] {
        &self.roster
    }

    /// The entity store.
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// The oracle adapter.
    pub const fn oracle(&self) -> &OracleAdapter<O> {
        &self.oracle
    }

    /// Replace the run caps.
    pub const fn set_limits(&mut self, max_ticks: u64, max_conversations: Option<u64>) {
        self.state.max_ticks = max_ticks;
        self.state.max_conversations = max_conversations;
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Overflow`] if the tick counter cannot advance.
    /// Cycle failures are logged and do not fail the tick.
    pub async fn step(&mut self) -> Result<TickStep, TickError> {
        if let Some(reason) = self.state.termination() {
            return Ok(TickStep::Finished(reason));
        }

        let tick = self.state.tick_count;
        let reading = self.clock.reading(tick);
        if reading.day > self.state.day {
            Box::pin(run_daily_review(
                &self.db,
                &self.oracle,
                &self.roster,
                &self.state,
                self.config.retention.plans_kept,
                self.state.day,
            ))
            .await;
            self.state.day_started_at = Utc::now();
        }
        self.state.set_time(reading);

        let selected = self.select().await;
        debug!(tick, hour = reading.hour, selected = selected.len(), "Agents selected");

        let before = self.state.conversation_count;
        let mut acted = Vec::with_capacity(selected.len());
        let mut failed = Vec::new();
        for index in selected {
            if self.state.conversation_limit_reached() {
                debug!(tick, "Conversation cap reached mid-tick; skipping remaining agents");
                break;
            }
            let Some(profile) = self.roster.get(index) else {
                continue;
            };
            let mut env = CycleEnv {
                db: &self.db,
                oracle: &self.oracle,
                config: &self.config,
                roster: &self.roster,
                dice: &mut self.dice,
            };
            match Box::pin(run_cycle(&mut env, &mut self.state, profile)).await {
                Ok(outcome) => {
                    debug!(
                        tick,
                        agent_id = %profile.id,
                        action = ?outcome.action,
                        memories = outcome.memories_written,
                        "Cycle done"
                    );
                    acted.push(profile.id.clone());
                }
                Err(err) => {
                    warn!(tick, agent_id = %profile.id, error = %err, "Cycle failed; continuing");
                    failed.push(profile.id.clone());
                }
            }
        }

        self.state.tick_count = tick.checked_add(1).ok_or(TickError::Overflow)?;
        self.state.global_event = None;
        self.check_global_event().await;

        Ok(TickStep::Ran(TickSummary {
            tick,
            day: reading.day,
            hour: reading.hour,
            time_of_day: reading.time_of_day,
            acted,
            failed,
            conversations: self.state.conversation_count.saturating_sub(before),
            conversation_count: self.state.conversation_count,
            global_event: self.state.global_event.clone(),
        }))
    }

    /// Indices into the roster of the agents that act this tick.
    async fn select(&self) -> Vec<usize> {
        match self.config.policy.selection {
            SelectionPolicy::ActiveHours => select_active(&self.roster, self.state.hour),
            SelectionPolicy::Oracle => {
                let now = Utc::now();
                let since_start = now
                    .signed_duration_since(self.state.day_started_at)
                    .num_minutes();
                let candidates: Vec<_> = self
                    .roster
                    .iter()
                    .map(|p| {
                        let runtime = self.state.agent_states.get(&p.id);
                        json!({
                            "id": p.id,
                            "name": p.name,
                            "energy": runtime.map(|r| r.energy_level),
                            "idle_minutes": runtime
                                .and_then(|r| r.idle_minutes(now))
                                .unwrap_or(since_start),
                            "summary": p.summary(),
                        })
                    })
                    .collect();
                let mut context = narrator_context(&self.state, &[]);
                if let Some(map) = context.as_object_mut() {
                    map.insert("candidates".to_owned(), json!(candidates));
                }
                let pairs: Vec<(&str, &str)> = self
                    .roster
                    .iter()
                    .map(|p| (p.id.as_str(), p.name.as_str()))
                    .collect();
                self.oracle
                    .select_agent(&context, &pairs)
                    .await
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Every `global_event_interval` ticks, ask for an optional event.
    /// Never fails the tick.
    async fn check_global_event(&mut self) {
        let interval = self.config.simulation.global_event_interval;
        let due = self
            .state
            .tick_count
            .checked_rem(interval)
            .is_some_and(|r| r == 0);
        if !due {
            return;
        }

        let recent = match self
            .db
            .conversations()
            .query(&ConversationQuery::recent(EVENT_CONTEXT_MESSAGES))
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "Global event check skipped");
                return;
            }
        };
        let lines: Vec<String> = recent
            .iter()
            .map(|c| format!("{}: {}", c.from_agent, c.message))
            .collect();
        let context = narrator_context(&self.state, &lines);
        if let Some(event) = self.oracle.global_event(&context).await {
            info!(tick = self.state.tick_count, event = %event, "Global event");
            self.state.global_event = Some(event);
        }
    }
}

/// Roster indices of agents awake at `hour`, ordered by agent id. When
/// nobody is awake, every agent, ordered by id.
pub fn select_active(roster: &[AgentProfile], hour: u8) -> Vec<usize> {
    let mut selected: Vec<usize> = roster
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_active_at(hour))
        .map(|(i, _)| i)
        .collect();
    if selected.is_empty() {
        selected = (0..roster.len()).collect();
    }
    selected.sort_by_key(|&i| roster.get(i).map(|p| p.id.clone()));
    selected
}
