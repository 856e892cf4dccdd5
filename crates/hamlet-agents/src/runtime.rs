//! Per-agent transient working state.
//!
//! One [`RuntimeState`] exists per registered agent for the lifetime of a
//! run. Cycle phases mutate only the state of the agent they are running
//! for. Nothing here is persisted directly; durable effects go through the
//! entity store as memories and conversations.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use hamlet_types::{ActionKind, AgentId, Conversation, Observation, Plan};
use serde::Serialize;

use crate::config::RuntimeConfig;

/// Lowest energy level.
pub const MIN_ENERGY: u8 = 1;

/// Highest energy level.
pub const MAX_ENERGY: u8 = 10;

/// Emotional state assigned at registration.
pub const DEFAULT_EMOTION: &str = "neutral";

/// Working state of one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeState {
    /// The agent this state belongs to.
    pub agent_id: AgentId,
    /// What the agent saw at the start of its latest cycle.
    pub current_observation: Option<Observation>,
    /// The agent's active plan.
    pub current_plan: Option<Plan>,
    /// Bounded window of recent conversations the agent took part in.
    pub recent_conversations: VecDeque<Conversation>,
    /// Energy in `[1, 10]`.
    pub energy_level: u8,
    /// Free-text mood, e.g. "neutral" or "worried".
    pub emotional_state: String,
    /// When the agent last acted or spoke.
    pub last_activity_time: Option<DateTime<Utc>>,
    /// What the agent did in its latest cycle.
    pub last_action: Option<ActionKind>,
    /// Completed cycles.
    pub cycles_completed: u64,
    /// Sequence of the newest conversation already observed.
    pub observed_through: Option<i64>,
}

impl RuntimeState {
    /// Fresh state for a newly registered agent.
    pub fn new(agent_id: AgentId, config: &RuntimeConfig) -> Self {
        Self {
            agent_id,
            current_observation: None,
            current_plan: None,
            recent_conversations: VecDeque::with_capacity(config.recent_window),
            energy_level: config.default_energy.clamp(MIN_ENERGY, MAX_ENERGY),
            emotional_state: DEFAULT_EMOTION.to_owned(),
            last_activity_time: None,
            last_action: None,
            cycles_completed: 0,
            observed_through: None,
        }
    }

    /// Append a conversation to the recent window.
    ///
    /// Once the window exceeds `recent_window`, the oldest entries are dropped
    /// until `recent_trim_to` remain. Dropped entries are already durable in
    /// the store. Also counts as activity.
    pub fn record_conversation(&mut self, conversation: Conversation, config: &RuntimeConfig) {
        self.last_activity_time = Some(conversation.created_at);
        self.recent_conversations.push_back(conversation);
        if self.recent_conversations.len() > config.recent_window {
            let excess = self
                .recent_conversations
                .len()
                .saturating_sub(config.recent_trim_to);
            self.recent_conversations.drain(..excess);
        }
    }

    /// Mark the agent as having just acted.
    pub fn touch(&mut self, now: DateTime<Utc>, action: ActionKind) {
        self.last_activity_time = Some(now);
        self.last_action = Some(action);
    }

    /// Recover energy after resting.
    pub fn rest(&mut self, config: &RuntimeConfig) {
        self.energy_level = self
            .energy_level
            .saturating_add(config.rest_recovery)
            .clamp(MIN_ENERGY, MAX_ENERGY);
    }

    /// Spend energy on an action.
    pub fn spend_energy(&mut self, config: &RuntimeConfig) {
        self.energy_level = self
            .energy_level
            .saturating_sub(config.action_cost)
            .clamp(MIN_ENERGY, MAX_ENERGY);
    }

    /// Replace the emotional state, ignoring blank input.
    pub fn set_emotion(&mut self, emotion: &str) {
        let trimmed = emotion.trim();
        if !trimmed.is_empty() {
            trimmed.clone_into(&mut self.emotional_state);
        }
    }

    /// Whether a conversation with sequence `seq` has not been observed yet.
    pub fn is_unobserved(&self, seq: i64) -> bool {
        self.observed_through.is_none_or(|seen| seq > seen)
    }

    /// Advance the observation marker; it never moves backwards.
    pub fn mark_observed(&mut self, seq: i64) {
        self.observed_through = Some(self.observed_through.map_or(seq, |seen| seen.max(seq)));
    }

    /// Minutes since the last activity, or `None` if the agent never acted.
    pub fn idle_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_activity_time
            .map(|t| now.signed_duration_since(t).num_minutes())
    }
}
