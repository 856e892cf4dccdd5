//! Durable records: memories, conversations, and plans.
//!
//! Memories and conversations are immutable once stored. Plans are the one
//! record whose per-action status may change in place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::enums::{ActionKind, ConversationKind, MemoryKind, PlanStatus};
use crate::ids::{AgentId, ConversationId, MemoryId, PlanId};

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// A stored, importance-ranked record of something an agent experienced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Memory {
    /// Unique id.
    pub id: MemoryId,
    /// Owning agent.
    pub agent_id: AgentId,
    /// Free-text content.
    pub content: String,
    /// What the memory records.
    pub kind: MemoryKind,
    /// Importance in `[1, 10]`.
    pub importance: u8,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Insertion sequence; larger is more recent.
    pub seq: i64,
    /// Arbitrary structured context.
    pub metadata: serde_json::Value,
}

/// A memory about to be appended. Importance is clamped on write.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemory {
    /// Owning agent.
    pub agent_id: AgentId,
    /// Free-text content.
    pub content: String,
    /// What the memory records.
    pub kind: MemoryKind,
    /// Requested importance, any value.
    pub importance: i64,
    /// Arbitrary structured context.
    pub metadata: serde_json::Value,
}

impl NewMemory {
    /// Build a memory with empty metadata.
    pub fn new(agent_id: &AgentId, kind: MemoryKind, content: impl Into<String>, importance: i64) -> Self {
        Self {
            agent_id: agent_id.clone(),
            content: content.into(),
            kind,
            importance,
            metadata: serde_json::Value::Null,
        }
    }

    /// Attach structured metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A stored conversation message, broadcast or directed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Conversation {
    /// Unique id.
    pub id: ConversationId,
    /// Speaker.
    pub from_agent: AgentId,
    /// Recipient, or `None` for a broadcast.
    pub to_agent: Option<AgentId>,
    /// What was said.
    pub message: String,
    /// Register of the message.
    pub kind: ConversationKind,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Insertion sequence; larger is more recent.
    pub seq: i64,
    /// Arbitrary structured context.
    pub metadata: serde_json::Value,
}

impl Conversation {
    /// Whether the message is addressed to everyone.
    pub const fn is_broadcast(&self) -> bool {
        self.to_agent.is_none()
    }

    /// Whether the given agent can see this message.
    pub fn visible_to(&self, agent: &AgentId) -> bool {
        &self.from_agent == agent || self.to_agent.as_ref().is_none_or(|to| to == agent)
    }
}

/// A conversation about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversation {
    /// Speaker.
    pub from_agent: AgentId,
    /// Recipient, or `None` for a broadcast.
    pub to_agent: Option<AgentId>,
    /// What was said.
    pub message: String,
    /// Register of the message.
    pub kind: ConversationKind,
    /// Arbitrary structured context.
    pub metadata: serde_json::Value,
}

/// Aggregate counts over stored conversations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConversationStats {
    /// Total stored conversations.
    pub total: u64,
    /// Count per conversation kind.
    pub by_kind: BTreeMap<String, u64>,
    /// Count per speaking agent.
    pub by_agent: BTreeMap<String, u64>,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlannedAction {
    /// What the agent intends to do.
    #[validate(length(min = 1))]
    pub description: String,
    /// Which executing branch the step maps to.
    pub kind: ActionKind,
    /// Priority in `[1, 10]`.
    #[validate(range(min = 1, max = 10))]
    pub priority: u8,
    /// Advisory progress marker.
    #[serde(default)]
    pub status: PlanStatus,
    /// Free-text slot such as "after lunch".
    #[serde(default)]
    pub planned_time: Option<String>,
}

/// An ordered list of intended actions for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Plan {
    /// Unique id.
    pub id: PlanId,
    /// Owning agent.
    pub agent_id: AgentId,
    /// Steps in intended order.
    #[validate(nested)]
    pub actions: Vec<PlannedAction>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Why the plan was made.
    pub context: String,
    /// Set once a newer plan for the same agent exists.
    #[serde(default)]
    pub superseded: bool,
}

impl Plan {
    /// Build a fresh plan.
    pub fn new(agent_id: &AgentId, actions: Vec<PlannedAction>, context: impl Into<String>) -> Self {
        Self {
            id: PlanId::new(),
            agent_id: agent_id.clone(),
            actions,
            created_at: Utc::now(),
            context: context.into(),
            superseded: false,
        }
    }

    /// Index and step of the highest-priority pending action. Earlier steps
    /// win ties.
    pub fn next_pending(&self) -> Option<(usize, &PlannedAction)> {
        self.next_pending_where(|_| true)
    }

    /// Like [`next_pending`](Self::next_pending), considering only steps
    /// accepted by `usable`.
    pub fn next_pending_where(
        &self,
        usable: impl Fn(&PlannedAction) -> bool,
    ) -> Option<(usize, &PlannedAction)> {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.status == PlanStatus::Pending && usable(a))
            .min_by_key(|(idx, a)| (core::cmp::Reverse(a.priority), *idx))
    }

    /// Highest action priority, or 1 for an empty plan.
    pub fn max_priority(&self) -> u8 {
        self.actions.iter().map(|a| a.priority).max().unwrap_or(1)
    }
}
