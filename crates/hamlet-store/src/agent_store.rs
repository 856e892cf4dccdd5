//! Agent registration and lookup.
//!
//! Profiles are stored whole as JSON next to the id and display name.
//! Registration is an upsert keyed by id, so re-registering a roster after a
//! profile edit updates it in place without disturbing the agent's history.

use hamlet_types::{AgentId, AgentProfile};
use sqlx::SqlitePool;
use validator::Validate;

use crate::error::StoreError;
use crate::sqlite::now_micros;

/// A row from the `agents` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentRow {
    /// Agent key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Profile JSON.
    pub profile: String,
}

impl TryFrom<AgentRow> for AgentProfile {
    type Error = StoreError;

    fn try_from(row: AgentRow) -> Result<Self, Self::Error> {
        Ok(serde_json::from_str(&row.profile)?)
    }
}

/// Operations on the `agents` table.
pub struct AgentStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AgentStore<'a> {
    /// Create a new agent store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and upsert a profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the profile is malformed, in
    /// which case nothing is written, or [`StoreError::Database`] if the
    /// write fails.
    pub async fn register(&self, profile: &AgentProfile) -> Result<(), StoreError> {
        profile
            .validate()
            .map_err(|e| StoreError::Validation(format!("profile {}: {e}", profile.id)))?;
        let json = serde_json::to_string(profile)?;
        let now = now_micros();

        sqlx::query(
            r"INSERT INTO agents (id, name, profile, created_at, updated_at)
              VALUES (?, ?, ?, ?, ?)
              ON CONFLICT(id) DO UPDATE SET
                  name = excluded.name,
                  profile = excluded.profile,
                  updated_at = excluded.updated_at",
        )
        .bind(profile.id.as_str())
        .bind(&profile.name)
        .bind(&json)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        tracing::debug!(agent_id = %profile.id, name = profile.name, "Registered agent");
        Ok(())
    }

    /// Fetch one profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the agent is not registered.
    pub async fn get(&self, id: &AgentId) -> Result<AgentProfile, StoreError> {
        let row = sqlx::query_as::<_, AgentRow>("SELECT id, name, profile FROM agents WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("agent {id}")))?;
        AgentProfile::try_from(row)
    }

    /// All registered profiles in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a profile cannot be
    /// decoded.
    pub async fn list(&self) -> Result<Vec<AgentProfile>, StoreError> {
        let rows = sqlx::query_as::<_, AgentRow>("SELECT id, name, profile FROM agents ORDER BY rowid ASC")
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(AgentProfile::try_from).collect()
    }

    /// Number of registered agents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agents")
            .fetch_one(self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
