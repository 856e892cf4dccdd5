//! Entity store for the Hamlet community simulation.
//!
//! A single embedded `SQLite` database holds four relations: agents,
//! memories, conversations, and plans. Every write is awaited to commit
//! before the call returns, and every append is one transaction, so a
//! record is either fully stored or not stored at all.
//!
//! ```text
//! Database (pool)
//!     |-- AgentStore         (validated profile upserts)
//!     |-- MemoryStore        (append + importance-first retention)
//!     |-- ConversationStore  (append, visibility queries, stats)
//!     +-- PlanStore          (append/supersede, status, prune)
//! ```
//!
//! # Modules
//!
//! - [`sqlite`] -- Connection pool, configuration, migrations
//! - [`agent_store`] -- Agent registration and lookup
//! - [`memory_store`] -- Memory appends and queries
//! - [`conversation_store`] -- Conversation appends, queries, stats
//! - [`plan_store`] -- Plan persistence
//! - [`retention`] -- Bounded-heap eviction policy
//! - [`error`] -- Shared error type

pub mod agent_store;
pub mod conversation_store;
pub mod error;
pub mod memory_store;
pub mod plan_store;
pub mod retention;
pub mod sqlite;

pub use agent_store::{AgentRow, AgentStore};
pub use conversation_store::{ConversationQuery, ConversationRow, ConversationStore};
pub use error::StoreError;
pub use memory_store::{MemoryQuery, MemoryRow, MemoryStore};
pub use plan_store::{PlanRow, PlanStore};
pub use retention::RetentionPolicy;
pub use sqlite::{Database, StoreConfig};
