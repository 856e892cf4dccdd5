//! Plan persistence.
//!
//! Appending a plan marks the agent's earlier plans as superseded rather
//! than deleting them. Superseded plans are only removed by an explicit
//! [`PlanStore::prune`]. Per-action status is the one piece of stored state
//! that changes in place.

use hamlet_types::{AgentId, Plan, PlanId, PlanStatus, PlannedAction};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::error::StoreError;
use crate::sqlite::from_micros;

/// A row from the `plans` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanRow {
    /// Plan id (UUID text).
    pub id: String,
    /// Owning agent.
    pub agent_id: String,
    /// Actions JSON array.
    pub actions: String,
    /// Why the plan was made.
    pub context: String,
    /// Nonzero once superseded.
    pub superseded: i64,
    /// Creation time in microseconds.
    pub created_at: i64,
}

impl TryFrom<PlanRow> for Plan {
    type Error = StoreError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Corrupt(format!("plan id {}: {e}", row.id)))?;
        let actions: Vec<PlannedAction> = serde_json::from_str(&row.actions)?;
        Ok(Self {
            id: PlanId::from(id),
            agent_id: AgentId::new(row.agent_id),
            actions,
            created_at: from_micros(row.created_at)?,
            context: row.context,
            superseded: row.superseded != 0,
        })
    }
}

/// Operations on the `plans` table.
pub struct PlanStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PlanStore<'a> {
    /// Create a new plan store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and store a plan, superseding the agent's earlier plans.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if any priority is outside
    /// `[1, 10]` or a description is empty, [`StoreError::UnknownAgent`] if
    /// the agent is not registered, or [`StoreError::Database`] on write
    /// failure.
    pub async fn append(&self, plan: &Plan) -> Result<(), StoreError> {
        plan.validate()
            .map_err(|e| StoreError::Validation(format!("plan for {}: {e}", plan.agent_id)))?;
        let actions = serde_json::to_string(&plan.actions)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE plans SET superseded = 1 WHERE agent_id = ? AND superseded = 0")
            .bind(plan.agent_id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r"INSERT INTO plans (id, agent_id, actions, context, superseded, created_at)
              VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(plan.id.to_string())
        .bind(plan.agent_id.as_str())
        .bind(&actions)
        .bind(&plan.context)
        .bind(plan.created_at.timestamp_micros())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::from_write(e, plan.agent_id.as_str()))?;
        tx.commit().await?;

        tracing::debug!(
            agent_id = %plan.agent_id,
            plan_id = %plan.id,
            actions = plan.actions.len(),
            "Stored plan"
        );
        Ok(())
    }

    /// The agent's latest plan that has not been superseded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or the row cannot be
    /// decoded.
    pub async fn current(&self, agent: &AgentId) -> Result<Option<Plan>, StoreError> {
        let row = sqlx::query_as::<_, PlanRow>(
            r"SELECT id, agent_id, actions, context, superseded, created_at
              FROM plans WHERE agent_id = ? AND superseded = 0
              ORDER BY seq DESC LIMIT 1",
        )
        .bind(agent.as_str())
        .fetch_optional(self.pool)
        .await?;
        row.map(Plan::try_from).transpose()
    }

    /// All plans for an agent, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a row cannot be decoded.
    pub async fn list(&self, agent: &AgentId) -> Result<Vec<Plan>, StoreError> {
        let rows = sqlx::query_as::<_, PlanRow>(
            r"SELECT id, agent_id, actions, context, superseded, created_at
              FROM plans WHERE agent_id = ? ORDER BY seq DESC",
        )
        .bind(agent.as_str())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(Plan::try_from).collect()
    }

    /// Set the status of every action in a plan.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the plan does not exist.
    pub async fn update_status(&self, plan_id: PlanId, status: PlanStatus) -> Result<(), StoreError> {
        self.rewrite_actions(plan_id, |actions| {
            for action in actions.iter_mut() {
                action.status = status;
            }
            Ok(())
        })
        .await
    }

    /// Set the status of one action in a plan.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the plan or the action index does
    /// not exist.
    pub async fn update_action_status(
        &self,
        plan_id: PlanId,
        index: usize,
        status: PlanStatus,
    ) -> Result<(), StoreError> {
        self.rewrite_actions(plan_id, |actions| {
            let action = actions
                .get_mut(index)
                .ok_or_else(|| StoreError::NotFound(format!("action {index} of plan {plan_id}")))?;
            action.status = status;
            Ok(())
        })
        .await
    }

    /// Delete the agent's superseded plans beyond the newest `keep`.
    /// Returns the number of plans removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the delete fails.
    pub async fn prune(&self, agent: &AgentId, keep: u32) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r"DELETE FROM plans
              WHERE agent_id = ? AND superseded = 1 AND seq NOT IN (
                  SELECT seq FROM plans
                  WHERE agent_id = ? AND superseded = 1
                  ORDER BY seq DESC LIMIT ?
              )",
        )
        .bind(agent.as_str())
        .bind(agent.as_str())
        .bind(i64::from(keep))
        .execute(self.pool)
        .await?;
        let removed = result.rows_affected();
        if removed > 0 {
            tracing::debug!(agent_id = %agent, removed, keep, "Pruned superseded plans");
        }
        Ok(removed)
    }

    /// Read, modify, and write back a plan's action list in one transaction.
    async fn rewrite_actions<F>(&self, plan_id: PlanId, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<PlannedAction>) -> Result<(), StoreError>,
    {
        let mut tx = self.pool.begin().await?;
        let actions: Option<String> = sqlx::query_scalar("SELECT actions FROM plans WHERE id = ?")
            .bind(plan_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let actions = actions.ok_or_else(|| StoreError::NotFound(format!("plan {plan_id}")))?;
        let mut actions: Vec<PlannedAction> = serde_json::from_str(&actions)?;
        edit(&mut actions)?;
        sqlx::query("UPDATE plans SET actions = ? WHERE id = ?")
            .bind(serde_json::to_string(&actions)?)
            .bind(plan_id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
