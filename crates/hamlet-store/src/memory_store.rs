//! Memory appends, queries, and retention.
//!
//! Each append runs in its own transaction together with any eviction it
//! triggers, so a memory either lands with the store already trimmed back
//! under the high-water mark, or not at all.

use chrono::{DateTime, Utc};
use hamlet_types::{AgentId, Memory, MemoryId, MemoryKind, NewMemory, clamp_importance};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::retention::{RetentionKey, RetentionPolicy, select_evictions};
use crate::sqlite::{from_micros, now_micros};

/// Columns selected for every memory query.
const MEMORY_COLUMNS: &str = "seq, id, agent_id, content, kind, importance, created_at, metadata";

/// A row from the `memories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemoryRow {
    /// Insertion sequence.
    pub seq: i64,
    /// Memory id (UUID text).
    pub id: String,
    /// Owning agent.
    pub agent_id: String,
    /// Free-text content.
    pub content: String,
    /// Kind string.
    pub kind: String,
    /// Importance, 1-10.
    pub importance: i64,
    /// Creation time in microseconds.
    pub created_at: i64,
    /// Metadata JSON.
    pub metadata: String,
}

impl TryFrom<MemoryRow> for Memory {
    type Error = StoreError;

    fn try_from(row: MemoryRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Corrupt(format!("memory id {}: {e}", row.id)))?;
        let kind = row
            .kind
            .parse::<MemoryKind>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Self {
            id: MemoryId::from(id),
            agent_id: AgentId::new(row.agent_id),
            content: row.content,
            kind,
            importance: clamp_importance(row.importance),
            created_at: from_micros(row.created_at)?,
            seq: row.seq,
            metadata: serde_json::from_str(&row.metadata)?,
        })
    }
}

/// Filters for [`MemoryStore::query`]. Set filters are AND-combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryQuery {
    /// Only this kind.
    pub kind: Option<MemoryKind>,
    /// Only memories created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Maximum rows returned.
    pub limit: u32,
}

impl MemoryQuery {
    /// The `limit` most recent memories of any kind.
    pub const fn recent(limit: u32) -> Self {
        Self {
            kind: None,
            since: None,
            limit,
        }
    }

    /// Restrict to one kind.
    #[must_use]
    pub const fn of_kind(mut self, kind: MemoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict to memories created at or after `since`.
    #[must_use]
    pub const fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }
}

/// Operations on the `memories` table.
pub struct MemoryStore<'a> {
    pool: &'a SqlitePool,
    retention: RetentionPolicy,
}

impl<'a> MemoryStore<'a> {
    /// Create a new memory store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            retention: RetentionPolicy {
                high_water: crate::retention::DEFAULT_HIGH_WATER,
                retain: crate::retention::DEFAULT_RETAIN,
            },
        }
    }

    /// Use different retention thresholds.
    #[must_use]
    pub const fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Append a memory, clamping its importance to `[1, 10]`, then evict if
    /// the agent is over the high-water mark.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownAgent`] if the agent is not registered,
    /// or [`StoreError::Database`] on write failure. On error nothing is
    /// written.
    pub async fn append(&self, memory: &NewMemory) -> Result<Memory, StoreError> {
        let id = MemoryId::new();
        let importance = clamp_importance(memory.importance);
        let created_at = now_micros();
        let metadata = serde_json::to_string(&memory.metadata)?;

        let mut tx = self.pool.begin().await?;

        let seq: i64 = sqlx::query_scalar(
            r"INSERT INTO memories (id, agent_id, content, kind, importance, created_at, metadata)
              VALUES (?, ?, ?, ?, ?, ?, ?)
              RETURNING seq",
        )
        .bind(id.to_string())
        .bind(memory.agent_id.as_str())
        .bind(&memory.content)
        .bind(memory.kind.as_str())
        .bind(i64::from(importance))
        .bind(created_at)
        .bind(&metadata)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::from_write(e, memory.agent_id.as_str()))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memories WHERE agent_id = ?")
            .bind(memory.agent_id.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let count = usize::try_from(count).unwrap_or(usize::MAX);
        if self.retention.should_evict(count) {
            let keys: Vec<(i64, i64)> =
                sqlx::query_as("SELECT seq, importance FROM memories WHERE agent_id = ?")
                    .bind(memory.agent_id.as_str())
                    .fetch_all(&mut *tx)
                    .await?;
            let evicted = select_evictions(
                keys.into_iter().map(|(seq, importance)| RetentionKey {
                    importance: clamp_importance(importance),
                    seq,
                }),
                self.retention.retain,
            );
            if !evicted.is_empty() {
                let mut builder: QueryBuilder<'_, Sqlite> =
                    QueryBuilder::new("DELETE FROM memories WHERE seq IN (");
                let mut separated = builder.separated(", ");
                for seq in &evicted {
                    separated.push_bind(*seq);
                }
                separated.push_unseparated(")");
                builder.build().execute(&mut *tx).await?;
                tracing::debug!(
                    agent_id = %memory.agent_id,
                    evicted = evicted.len(),
                    retained = self.retention.retain,
                    "Evicted low-importance memories"
                );
            }
        }

        tx.commit().await?;

        Ok(Memory {
            id,
            agent_id: memory.agent_id.clone(),
            content: memory.content.clone(),
            kind: memory.kind,
            importance,
            created_at: from_micros(created_at)?,
            seq,
            metadata: memory.metadata.clone(),
        })
    }

    /// Memories for one agent, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a row cannot be decoded.
    pub async fn query(&self, agent: &AgentId, query: MemoryQuery) -> Result<Vec<Memory>, StoreError> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE agent_id = "
        ));
        builder.push_bind(agent.as_str());
        if let Some(kind) = query.kind {
            builder.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(since) = query.since {
            builder.push(" AND created_at >= ").push_bind(since.timestamp_micros());
        }
        builder
            .push(" ORDER BY seq DESC LIMIT ")
            .push_bind(i64::from(query.limit));

        let rows = builder.build_query_as::<MemoryRow>().fetch_all(self.pool).await?;
        rows.into_iter().map(Memory::try_from).collect()
    }

    /// Every stored memory for one agent, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a row cannot be decoded.
    pub async fn all_for(&self, agent: &AgentId) -> Result<Vec<Memory>, StoreError> {
        let rows = sqlx::query_as::<_, MemoryRow>(&format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE agent_id = ? ORDER BY seq DESC"
        ))
        .bind(agent.as_str())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(Memory::try_from).collect()
    }

    /// Number of stored memories for one agent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    pub async fn count(&self, agent: &AgentId) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM memories WHERE agent_id = ?")
            .bind(agent.as_str())
            .fetch_one(self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
