//! Error types for the entity store.
//!
//! All store failures surface as [`StoreError`]. Profile and plan
//! validation failures are reported through the same type so callers have
//! one error to log per store call.

/// Errors that can occur in the entity store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record failed validation and was not stored.
    #[error("validation error: {0}")]
    Validation(String),

    /// A `SQLite` operation failed.
    #[error("SQLite error: {0}")]
    Database(#[from] sqlx::Error),

    /// An embedded migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Metadata or plan actions could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The database directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record referenced an agent that is not registered.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// A requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A stored row could not be decoded into its domain type.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Invalid store configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Map a write failure, turning foreign-key violations into
    /// [`StoreError::UnknownAgent`].
    pub(crate) fn from_write(err: sqlx::Error, agent: &str) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.is_foreign_key_violation()
        {
            return Self::UnknownAgent(agent.to_owned());
        }
        Self::Database(err)
    }
}
