//! Conversation appends, queries, and aggregate statistics.
//!
//! A conversation is visible to its sender, its recipient, and, when it is
//! a broadcast (`to_agent IS NULL`), to everyone.

use chrono::{DateTime, Utc};
use hamlet_types::{
    AgentId, Conversation, ConversationId, ConversationKind, ConversationStats, NewConversation,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::sqlite::{from_micros, now_micros};

/// Columns selected for every conversation query.
const CONVERSATION_COLUMNS: &str = "seq, id, from_agent, to_agent, message, kind, created_at, metadata";

/// A row from the `conversations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConversationRow {
    /// Insertion sequence.
    pub seq: i64,
    /// Conversation id (UUID text).
    pub id: String,
    /// Speaker.
    pub from_agent: String,
    /// Recipient, `NULL` for a broadcast.
    pub to_agent: Option<String>,
    /// Message text.
    pub message: String,
    /// Kind string.
    pub kind: String,
    /// Creation time in microseconds.
    pub created_at: i64,
    /// Metadata JSON.
    pub metadata: String,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = StoreError;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Corrupt(format!("conversation id {}: {e}", row.id)))?;
        let kind = row
            .kind
            .parse::<ConversationKind>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Self {
            id: ConversationId::from(id),
            from_agent: AgentId::new(row.from_agent),
            to_agent: row.to_agent.map(AgentId::new),
            message: row.message,
            kind,
            created_at: from_micros(row.created_at)?,
            seq: row.seq,
            metadata: serde_json::from_str(&row.metadata)?,
        })
    }
}

/// Filters for [`ConversationStore::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationQuery {
    /// Only conversations visible to this agent.
    pub agent: Option<AgentId>,
    /// Drop conversations sent by [`agent`](Self::agent) itself.
    pub exclude_own: bool,
    /// Only conversations created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Maximum rows returned.
    pub limit: u32,
}

impl ConversationQuery {
    /// The `limit` most recent conversations community-wide.
    pub const fn recent(limit: u32) -> Self {
        Self {
            agent: None,
            exclude_own: false,
            since: None,
            limit,
        }
    }

    /// Restrict to conversations visible to `agent`.
    #[must_use]
    pub fn visible_to(mut self, agent: &AgentId) -> Self {
        self.agent = Some(agent.clone());
        self
    }

    /// Skip the agent's own messages.
    #[must_use]
    pub const fn excluding_own(mut self) -> Self {
        self.exclude_own = true;
        self
    }

    /// Restrict to conversations created at or after `since`.
    #[must_use]
    pub const fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }
}

/// Operations on the `conversations` table.
pub struct ConversationStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ConversationStore<'a> {
    /// Create a new conversation store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one conversation.
    ///
    /// The caller owns the simulation-wide conversation counter and must
    /// bump it once for every `Ok` returned here.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownAgent`] if either party is not
    /// registered, or [`StoreError::Database`] on write failure. On error
    /// nothing is written.
    pub async fn append(&self, conversation: &NewConversation) -> Result<Conversation, StoreError> {
        let id = ConversationId::new();
        let created_at = now_micros();
        let metadata = serde_json::to_string(&conversation.metadata)?;

        let seq: i64 = sqlx::query_scalar(
            r"INSERT INTO conversations (id, from_agent, to_agent, message, kind, created_at, metadata)
              VALUES (?, ?, ?, ?, ?, ?, ?)
              RETURNING seq",
        )
        .bind(id.to_string())
        .bind(conversation.from_agent.as_str())
        .bind(conversation.to_agent.as_ref().map(AgentId::as_str))
        .bind(&conversation.message)
        .bind(conversation.kind.as_str())
        .bind(created_at)
        .bind(&metadata)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let parties = conversation.to_agent.as_ref().map_or_else(
                || conversation.from_agent.to_string(),
                |to| format!("{} -> {to}", conversation.from_agent),
            );
            StoreError::from_write(e, &parties)
        })?;

        tracing::debug!(
            from = %conversation.from_agent,
            to = ?conversation.to_agent.as_ref().map(AgentId::as_str),
            kind = %conversation.kind,
            "Stored conversation"
        );

        Ok(Conversation {
            id,
            from_agent: conversation.from_agent.clone(),
            to_agent: conversation.to_agent.clone(),
            message: conversation.message.clone(),
            kind: conversation.kind,
            created_at: from_micros(created_at)?,
            seq,
            metadata: conversation.metadata.clone(),
        })
    }

    /// Conversations matching `query`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a row cannot be decoded.
    pub async fn query(&self, query: &ConversationQuery) -> Result<Vec<Conversation>, StoreError> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE 1 = 1"
        ));
        if let Some(agent) = &query.agent {
            builder
                .push(" AND (from_agent = ")
                .push_bind(agent.as_str())
                .push(" OR to_agent = ")
                .push_bind(agent.as_str())
                .push(" OR to_agent IS NULL)");
            if query.exclude_own {
                builder.push(" AND from_agent <> ").push_bind(agent.as_str());
            }
        }
        if let Some(since) = query.since {
            builder.push(" AND created_at >= ").push_bind(since.timestamp_micros());
        }
        builder
            .push(" ORDER BY seq DESC LIMIT ")
            .push_bind(i64::from(query.limit));

        let rows = builder
            .build_query_as::<ConversationRow>()
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(Conversation::try_from).collect()
    }

    /// Total number of stored conversations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Totals by kind and by speaker.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a query fails.
    pub async fn stats(&self) -> Result<ConversationStats, StoreError> {
        let by_kind: Vec<(String, i64)> =
            sqlx::query_as("SELECT kind, COUNT(*) FROM conversations GROUP BY kind ORDER BY kind")
                .fetch_all(self.pool)
                .await?;
        let by_agent: Vec<(String, i64)> = sqlx::query_as(
            "SELECT from_agent, COUNT(*) FROM conversations GROUP BY from_agent ORDER BY from_agent",
        )
        .fetch_all(self.pool)
        .await?;

        let to_u64 = |n: i64| u64::try_from(n).unwrap_or(0);
        let by_kind: std::collections::BTreeMap<String, u64> =
            by_kind.into_iter().map(|(k, n)| (k, to_u64(n))).collect();
        let total = by_kind.values().copied().fold(0_u64, u64::saturating_add);

        Ok(ConversationStats {
            total,
            by_kind,
            by_agent: by_agent.into_iter().map(|(a, n)| (a, to_u64(n))).collect(),
        })
    }
}
