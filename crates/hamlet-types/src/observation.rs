//! The observation assembled for an agent at the start of its cycle.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::TimeOfDay;
use crate::ids::AgentId;
use crate::structs::Memory;

/// Another agent's recent message as seen by the observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SocialObservation {
    /// Who spoke.
    pub from_agent: AgentId,
    /// Speaker's display name.
    pub from_name: String,
    /// What was said.
    pub message: String,
    /// Whether the message was addressed to the observer directly.
    pub direct: bool,
    /// Heuristic importance in `[1, 10]`.
    pub importance: u8,
}

/// Everything the observing phase gathered for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Observation {
    /// Simulation tick the observation belongs to.
    pub tick: u64,
    /// Simulated day.
    pub day: u64,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Coarse label for the hour.
    pub time_of_day: TimeOfDay,
    /// Recent messages from other agents.
    pub social: Vec<SocialObservation>,
    /// The agent's own most recent memories.
    pub recent_memories: Vec<Memory>,
    /// Community event announced by the scheduler, if any.
    pub global_event: Option<String>,
}

impl Observation {
    /// Social items scored above the given threshold.
    pub fn important(&self, threshold: u8) -> impl Iterator<Item = &SocialObservation> {
        self.social.iter().filter(move |s| s.importance > threshold)
    }
}
