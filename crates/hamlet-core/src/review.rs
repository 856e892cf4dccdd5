//! End-of-day review.
//!
//! When the clock rolls over into a new day, every agent looks back over
//! the day just finished: one `experience-summary` memory when the day left
//! anything behind, one `wisdom` memory once enough wisdom candidates have
//! accumulated, then old superseded plans are pruned. A failure for one
//! agent is logged and the review moves on to the next.

use chrono::{DateTime, Utc};
use hamlet_agents::RuntimeState;
use hamlet_agents::memory::{WISDOM_MIN_CANDIDATES, prompt_lines, wisdom_candidates};
use hamlet_oracle::{Oracle, OracleAdapter};
use hamlet_store::{Database, MemoryQuery, StoreError};
use hamlet_types::{AgentProfile, MemoryKind, NewMemory};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::context::review_context;
use crate::state::SimulationState;

/// Importance of `experience-summary` memories.
const SUMMARY_IMPORTANCE: i64 = 8;

/// Importance of `wisdom` memories.
const WISDOM_IMPORTANCE: i64 = 9;

/// Most memories of one day fed to the summary prompt.
const SUMMARY_MEMORY_LIMIT: u32 = 50;

/// Most wisdom candidates fed to the wisdom prompt.
const WISDOM_PROMPT_LIMIT: usize = 10;

/// Counts from one daily review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyReview {
    /// The day that was reviewed.
    pub day: u64,
    /// Agents reviewed without error.
    pub agents_reviewed: u32,
    /// Experience summaries written.
    pub summaries: u32,
    /// Wisdom memories written.
    pub wisdom: u32,
    /// Superseded plans removed.
    pub plans_pruned: u64,
}

#[derive(Debug, Default)]
struct AgentReview {
    summary: bool,
    wisdom: bool,
    pruned: u64,
}

/// Review `day` for every agent in `roster`.
pub async fn run_daily_review<O: Oracle>(
    db: &Database,
    oracle: &OracleAdapter<O>,
    roster: &[AgentProfile],
    state: &SimulationState,
    plans_kept: u32,
    day: u64,
) -> DailyReview {
    let mut review = DailyReview {
        day,
        ..DailyReview::default()
    };
    for profile in roster {
        let Some(runtime) = state.agent_states.get(&profile.id) else {
            continue;
        };
        match review_agent(db, oracle, profile, runtime, state.day_started_at, plans_kept, day).await
        {
            Ok(done) => {
                review.agents_reviewed = review.agents_reviewed.saturating_add(1);
                review.summaries = review.summaries.saturating_add(u32::from(done.summary));
                review.wisdom = review.wisdom.saturating_add(u32::from(done.wisdom));
                review.plans_pruned = review.plans_pruned.saturating_add(done.pruned);
            }
            Err(err) => {
                warn!(agent_id = %profile.id, day, error = %err, "Daily review failed; skipping agent");
            }
        }
    }
    info!(
        day,
        agents = review.agents_reviewed,
        summaries = review.summaries,
        wisdom = review.wisdom,
        plans_pruned = review.plans_pruned,
        "Daily review complete"
    );
    review
}

async fn review_agent<O: Oracle>(
    db: &Database,
    oracle: &OracleAdapter<O>,
    profile: &AgentProfile,
    runtime: &RuntimeState,
    day_started_at: DateTime<Utc>,
    plans_kept: u32,
    day: u64,
) -> Result<AgentReview, StoreError> {
    let mut done = AgentReview::default();
    let memories = db.memories();

    let today = memories
        .query(
            &profile.id,
            MemoryQuery::recent(SUMMARY_MEMORY_LIMIT).since(day_started_at),
        )
        .await?;
    if !today.is_empty() {
        let context = review_context(profile, runtime, day, prompt_lines(&today));
        let text = oracle.experience_summary(&context, day, today.len()).await;
        memories
            .append(
                &NewMemory::new(&profile.id, MemoryKind::ExperienceSummary, text, SUMMARY_IMPORTANCE)
                    .with_metadata(json!({ "day": day, "memories": today.len() })),
            )
            .await?;
        done.summary = true;
    }

    let all = memories.all_for(&profile.id).await?;
    let candidates = wisdom_candidates(&all);
    if candidates.len() >= WISDOM_MIN_CANDIDATES {
        let lines: Vec<String> = candidates
            .iter()
            .take(WISDOM_PROMPT_LIMIT)
            .map(|m| format!("[{}] {}", m.kind, m.content))
            .collect();
        let context = review_context(profile, runtime, day, lines);
        let text = oracle.wisdom(&context).await;
        memories
            .append(
                &NewMemory::new(&profile.id, MemoryKind::Wisdom, text, WISDOM_IMPORTANCE)
                    .with_metadata(json!({ "day": day, "candidates": candidates.len() })),
            )
            .await?;
        done.wisdom = true;
    }

    done.pruned = db.plans().prune(&profile.id, plans_kept).await?;
    debug!(
        agent_id = %profile.id,
        day,
        summary = done.summary,
        wisdom = done.wisdom,
        pruned = done.pruned,
        "Reviewed agent"
    );
    Ok(done)
}
