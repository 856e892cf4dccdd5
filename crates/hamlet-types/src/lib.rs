//! Shared type definitions for the Hamlet community simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace: agent profiles, memories, conversations, plans, and the
//! observation handed to an agent at the start of its cycle. Types flow to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly-typed identifiers
//! - [`enums`] -- Closed vocabularies (memory kinds, actions, time of day)
//! - [`profile`] -- Validated agent profiles
//! - [`structs`] -- Memory, conversation, and plan records
//! - [`observation`] -- What an agent sees when its cycle begins

pub mod enums;
pub mod ids;
pub mod observation;
pub mod profile;
pub mod structs;

pub use enums::{ActionKind, ConversationKind, MemoryKind, ParseKindError, PlanStatus, TimeOfDay};
pub use ids::{AgentId, ConversationId, MemoryId, PlanId};
pub use observation::{Observation, SocialObservation};
pub use profile::{AgentProfile, Child, DigitalHabits, Personality};
pub use structs::{
    Conversation, ConversationStats, Memory, NewConversation, NewMemory, Plan, PlannedAction,
};

/// Lowest importance a memory may carry.
pub const MIN_IMPORTANCE: u8 = 1;

/// Highest importance a memory may carry.
pub const MAX_IMPORTANCE: u8 = 10;

/// Clamp an arbitrary importance score into `[1, 10]`.
///
/// Accepts a signed input so oracle-parsed and caller-computed scores can be
/// passed through without a prior range check.
pub fn clamp_importance(value: i64) -> u8 {
    let clamped = value.clamp(i64::from(MIN_IMPORTANCE), i64::from(MAX_IMPORTANCE));
    u8::try_from(clamped).unwrap_or(MAX_IMPORTANCE)
}
