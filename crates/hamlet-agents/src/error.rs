//! Error types for the `hamlet-agents` crate.

use hamlet_store::StoreError;

/// Errors that can occur in agent state and retrieval operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Runtime configuration values are inconsistent.
    #[error("invalid runtime config: {0}")]
    InvalidConfig(String),

    /// The entity store failed while loading memories.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}
