//! Importance-first memory retention.
//!
//! When an agent's stored memory count rises above the high-water mark, only
//! the `retain` most important memories survive. Ties on importance keep the
//! more recent memory. Survivors are chosen with a bounded min-heap so a
//! check over `n` memories costs `O(n log retain)`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Default count above which eviction runs.
pub const DEFAULT_HIGH_WATER: usize = 100;

/// Default count kept after eviction.
pub const DEFAULT_RETAIN: usize = 80;

/// Thresholds for per-agent memory eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Eviction runs once the stored count exceeds this.
    pub high_water: usize,
    /// Number of memories kept after eviction.
    pub retain: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            high_water: DEFAULT_HIGH_WATER,
            retain: DEFAULT_RETAIN,
        }
    }
}

impl RetentionPolicy {
    /// Check that the thresholds are usable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if `retain` is zero or exceeds
    /// `high_water`.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.retain == 0 || self.retain > self.high_water {
            return Err(StoreError::Config(format!(
                "retention retain ({}) must be in 1..={}",
                self.retain, self.high_water
            )));
        }
        Ok(())
    }

    /// Whether a stored count calls for eviction.
    pub const fn should_evict(&self, count: usize) -> bool {
        count > self.high_water
    }
}

/// Ranking key for one stored memory: importance first, then insertion
/// sequence (recency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RetentionKey {
    /// Stored importance.
    pub importance: u8,
    /// Insertion sequence; larger is newer.
    pub seq: i64,
}

/// Return the sequence numbers to delete so that only the `retain` best
/// keys survive.
///
/// Keys are pushed through a min-heap capped at `retain` entries; each
/// overflow pops the current weakest key, which is evicted.
pub fn select_evictions(keys: impl IntoIterator<Item = RetentionKey>, retain: usize) -> Vec<i64> {
    let mut heap: BinaryHeap<Reverse<RetentionKey>> = BinaryHeap::with_capacity(retain.saturating_add(1));
    let mut evicted = Vec::new();

    for key in keys {
        heap.push(Reverse(key));
        if heap.len() > retain
            && let Some(Reverse(weakest)) = heap.pop()
        {
            evicted.push(weakest.seq);
        }
    }

    evicted.sort_unstable();
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(importance: u8, seq: i64) -> RetentionKey {
        RetentionKey { importance, seq }
    }

    #[test]
    fn nothing_evicted_under_capacity() {
        let keys = (1..=5).map(|s| key(5, s));
        assert!(select_evictions(keys, 10).is_empty());
    }

    #[test]
    fn lowest_importance_goes_first() {
        let keys = vec![key(9, 1), key(1, 2), key(5, 3), key(2, 4)];
        assert_eq!(select_evictions(keys, 2), vec![2, 4]);
    }

    #[test]
    fn ties_keep_the_most_recent() {
        let keys = (1..=6).map(|s| key(4, s));
        assert_eq!(select_evictions(keys, 3), vec![1, 2, 3]);
    }

    #[test]
    fn retain_zero_is_invalid() {
        let policy = RetentionPolicy {
            high_water: 10,
            retain: 0,
        };
        assert!(policy.validate().is_err());
        assert!(RetentionPolicy::default().validate().is_ok());
        assert!(RetentionPolicy::default().should_evict(101));
        assert!(!RetentionPolicy::default().should_evict(100));
    }
}
