//! `SQLite` connection pool and configuration.
//!
//! `SQLite` is the single durable store for a simulation run. Writes are
//! awaited to commit before a call returns, so every later read in the same
//! process observes them.
//!
//! Uses [`sqlx`] with runtime query construction so no database is needed
//! at build time. All queries are parameterized.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::agent_store::AgentStore;
use crate::conversation_store::ConversationStore;
use crate::error::StoreError;
use crate::memory_store::MemoryStore;
use crate::plan_store::PlanStore;
use crate::retention::RetentionPolicy;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Default time to wait on a locked database.
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Configuration for the `SQLite` connection pool.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the database file. Parent directories are created.
    pub path: PathBuf,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// How long a writer waits on a locked database.
    pub busy_timeout: Duration,
    /// Memory retention thresholds.
    pub retention: RetentionPolicy,
}

impl StoreConfig {
    /// Create a configuration for the given database file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
            retention: RetentionPolicy::default(),
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the memory retention thresholds.
    #[must_use]
    pub const fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }
}

/// Connection pool handle to the `SQLite` store.
///
/// Hands out borrowed per-table stores bound to the pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    retention: RetentionPolicy,
}

impl Database {
    /// Open (creating if needed) the database file described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the parent directory cannot be created
    /// and [`StoreError::Database`] if the connection fails.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        config.retention.validate()?;
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "Opened SQLite store"
        );

        Ok(Self {
            pool,
            retention: config.retention,
        })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since each
    /// `SQLite` memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection fails.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool,
            retention: RetentionPolicy::default(),
        })
    }

    /// Replace the memory retention thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if `retain` exceeds `high_water`.
    pub fn set_retention(&mut self, retention: RetentionPolicy) -> Result<(), StoreError> {
        retention.validate()?;
        self.retention = retention;
        Ok(())
    }

    /// Apply all embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Migration`] if any migration fails.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Store migrations completed");
        Ok(())
    }

    /// Return a reference to the underlying [`SqlitePool`].
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Operations on registered agents.
    pub const fn agents(&self) -> AgentStore<'_> {
        AgentStore::new(&self.pool)
    }

    /// Operations on memories, using the configured retention policy.
    pub const fn memories(&self) -> MemoryStore<'_> {
        MemoryStore::new(&self.pool).with_retention(self.retention)
    }

    /// Operations on conversations.
    pub const fn conversations(&self) -> ConversationStore<'_> {
        ConversationStore::new(&self.pool)
    }

    /// Operations on plans.
    pub const fn plans(&self) -> PlanStore<'_> {
        PlanStore::new(&self.pool)
    }

    /// Delete every memory, conversation, and plan. Agents are kept.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if any delete fails; nothing is
    /// deleted in that case.
    pub async fn clear_history(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM memories").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM conversations").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM plans").execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!("Cleared stored history");
        Ok(())
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite store closed");
    }
}

/// Current time as stored microseconds.
pub(crate) fn now_micros() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

/// Decode stored microseconds.
pub(crate) fn from_micros(micros: i64) -> Result<chrono::DateTime<chrono::Utc>, StoreError> {
    chrono::DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {micros}")))
}
