//! Agent runtime state, memory ranking, and observation heuristics for the
//! Hamlet simulation.
//!
//! This crate holds the logic that operates on a single agent without
//! deciding anything on its behalf: its transient working state, how its
//! stored memories are ranked for a topic, and how observed messages are
//! scored. Orchestration lives in `hamlet-core`.
//!
//! # Modules
//!
//! - [`config`] -- Runtime state parameters ([`RuntimeConfig`])
//! - [`runtime`] -- Per-agent working state ([`RuntimeState`])
//! - [`memory`] -- Keyword relevance ranking and wisdom candidate selection
//! - [`salience`] -- Importance scoring for observed messages
//! - [`error`] -- Error types ([`AgentError`])

pub mod config;
pub mod error;
pub mod memory;
pub mod runtime;
pub mod salience;

pub use config::RuntimeConfig;
pub use error::AgentError;
pub use memory::{rank_relevant, relevant_memories};
pub use runtime::RuntimeState;
