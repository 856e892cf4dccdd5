//! The owned simulation state threaded through the scheduler.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hamlet_agents::{RuntimeConfig, RuntimeState};
use hamlet_types::{AgentId, AgentProfile, TimeOfDay};
use serde::Serialize;

use crate::clock::ClockReading;
use crate::operator::SimulationEndReason;

/// Process-wide counters and per-agent runtime state for one run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationState {
    /// Ticks completed so far.
    pub tick_count: u64,
    /// Current simulated day, starting at 1.
    pub day: u64,
    /// Current hour, 0-23.
    pub hour: u8,
    /// Label for the current hour.
    pub time_of_day: TimeOfDay,
    /// Conversations appended during this run.
    pub conversation_count: u64,
    /// Hard cap on conversations, if any.
    pub max_conversations: Option<u64>,
    /// Hard cap on ticks.
    pub max_ticks: u64,
    /// Runtime state per registered agent.
    pub agent_states: BTreeMap<AgentId, RuntimeState>,
    /// Community event announced for the next observations.
    pub global_event: Option<String>,
    /// When the current simulated day began; the daily review summarizes
    /// memories written since.
    pub day_started_at: DateTime<Utc>,
}

impl SimulationState {
    /// Fresh state with one runtime state per profile and counters at zero.
    pub fn new(
        roster: &[AgentProfile],
        runtime: &RuntimeConfig,
        start: ClockReading,
        max_ticks: u64,
        max_conversations: Option<u64>,
    ) -> Self {
        let agent_states = roster
            .iter()
            .map(|p| (p.id.clone(), RuntimeState::new(p.id.clone(), runtime)))
            .collect();
        Self {
            tick_count: 0,
            day: start.day,
            hour: start.hour,
            time_of_day: start.time_of_day,
            conversation_count: 0,
            max_conversations,
            max_ticks,
            agent_states,
            global_event: None,
            day_started_at: Utc::now(),
        }
    }

    /// Whether the conversation cap has been reached.
    pub fn conversation_limit_reached(&self) -> bool {
        self.max_conversations
            .is_some_and(|max| self.conversation_count >= max)
    }

    /// Whether the tick cap has been reached.
    pub const fn tick_limit_reached(&self) -> bool {
        self.tick_count >= self.max_ticks
    }

    /// The reason the run must stop before the next tick, if any.
    /// The conversation cap is checked first.
    pub fn termination(&self) -> Option<SimulationEndReason> {
        if self.conversation_limit_reached() {
            Some(SimulationEndReason::ConversationLimitReached)
        } else if self.tick_limit_reached() {
            Some(SimulationEndReason::MaxTicksReached)
        } else {
            None
        }
    }

    /// Move the clock fields to a new reading.
    pub(crate) const fn set_time(&mut self, reading: ClockReading) {
        self.day = reading.day;
        self.hour = reading.hour;
        self.time_of_day = reading.time_of_day;
    }
}
