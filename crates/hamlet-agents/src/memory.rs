//! Memory ranking and retrieval.
//!
//! Relevance is keyword overlap between a topic and a memory's content:
//! both are lowercased, split on whitespace, and stripped of surrounding
//! punctuation. Matches rank by overlap count, then importance, then
//! recency. Ranking is a pure function of the stored memories, so the same
//! inputs always produce the same ordered output.
//!
//! Overlap is a stand-in for semantic similarity. [`rank_relevant`] is the
//! single seam where a vector-similarity scorer would plug in.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use hamlet_store::Database;
use hamlet_types::{AgentId, Memory, MemoryKind};

use crate::error::AgentError;

/// Importance at or above which any memory counts toward wisdom.
pub const WISDOM_IMPORTANCE_THRESHOLD: u8 = 6;

/// Number of wisdom candidates an agent needs before distilling wisdom.
pub const WISDOM_MIN_CANDIDATES: usize = 5;

/// Lowercased, punctuation-trimmed whitespace tokens.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Number of distinct topic tokens present in `content`.
pub fn keyword_overlap(topic_tokens: &BTreeSet<String>, content: &str) -> usize {
    let content_tokens = tokenize(content);
    topic_tokens.intersection(&content_tokens).count()
}

/// Rank `memories` against `topic` and keep the best `limit`.
///
/// Memories sharing no token with the topic are excluded. An empty result
/// is not an error.
pub fn rank_relevant(memories: &[Memory], topic: &str, limit: usize) -> Vec<Memory> {
    let topic_tokens = tokenize(topic);
    if topic_tokens.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &Memory)> = memories
        .iter()
        .map(|m| (keyword_overlap(&topic_tokens, &m.content), m))
        .filter(|(overlap, _)| *overlap > 0)
        .collect();

    scored.sort_by_key(|(overlap, m)| (Reverse(*overlap), Reverse(m.importance), Reverse(m.seq)));
    scored.into_iter().take(limit).map(|(_, m)| m.clone()).collect()
}

/// Load an agent's memories from the store and rank them against `topic`.
///
/// # Errors
///
/// Returns [`AgentError::Store`] if the memories cannot be loaded.
pub async fn relevant_memories(
    db: &Database,
    agent: &AgentId,
    topic: &str,
    limit: usize,
) -> Result<Vec<Memory>, AgentError> {
    let memories = db.memories().all_for(agent).await?;
    Ok(rank_relevant(&memories, topic, limit))
}

/// Whether a memory is worth drawing wisdom from.
pub fn is_wisdom_candidate(memory: &Memory) -> bool {
    memory.importance >= WISDOM_IMPORTANCE_THRESHOLD
        || matches!(
            memory.kind,
            MemoryKind::Learning | MemoryKind::ExperienceSummary | MemoryKind::Reflection
        )
}

/// Wisdom candidates among `memories`, most important first.
pub fn wisdom_candidates(memories: &[Memory]) -> Vec<&Memory> {
    let mut candidates: Vec<&Memory> = memories.iter().filter(|m| is_wisdom_candidate(m)).collect();
    candidates.sort_by_key(|m| (Reverse(m.importance), Reverse(m.seq)));
    candidates
}

/// Render memories as short prompt lines, `[kind] content`.
pub fn prompt_lines(memories: &[Memory]) -> Vec<String> {
    memories
        .iter()
        .map(|m| format!("[{}] {}", m.kind, m.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use hamlet_types::MemoryId;

    use super::*;

    fn memory(seq: i64, content: &str, importance: u8, kind: MemoryKind) -> Memory {
        Memory {
            id: MemoryId::new(),
            agent_id: AgentId::new("a"),
            content: content.to_owned(),
            kind,
            importance,
            created_at: Utc::now(),
            seq,
            metadata: serde_json::Value::Null,
        }
    }

    fn sample() -> Vec<Memory> {
        vec![
            memory(1, "Baby had a fever last night", 8, MemoryKind::Concern),
            memory(2, "Watched a video about fever and rash", 5, MemoryKind::Learning),
            memory(3, "Cooked dinner", 3, MemoryKind::Action),
            memory(4, "Fever medicine dosage for a baby", 5, MemoryKind::Learning),
            memory(5, "The baby slept well", 4, MemoryKind::Observation),
        ]
    }

    #[test]
    fn ranks_by_overlap_then_importance_then_recency() {
        let ranked = rank_relevant(&sample(), "baby fever", 10);
        let seqs: Vec<i64> = ranked.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 4, 2, 5]);
    }

    #[test]
    fn matching_is_case_and_punctuation_insensitive() {
        let ranked = rank_relevant(&sample(), "FEVER!", 10);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        assert!(rank_relevant(&sample(), "tax returns", 5).is_empty());
        assert!(rank_relevant(&sample(), "   ", 5).is_empty());
        assert!(rank_relevant(&sample(), "fever", 0).is_empty());
    }

    #[test]
    fn ranking_is_deterministic() {
        let memories = sample();
        let first = rank_relevant(&memories, "fever", 5);
        let second = rank_relevant(&memories, "fever", 5);
        assert_eq!(first, second);
    }

    #[test]
    fn limit_truncates() {
        let ranked = rank_relevant(&sample(), "baby", 2);
        let seqs: Vec<i64> = ranked.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 4]);
    }

    #[test]
    fn wisdom_candidates_by_importance_or_kind() {
        let memories = sample();
        let candidates = wisdom_candidates(&memories);
        let seqs: Vec<i64> = candidates.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 4, 2]);
    }
}
