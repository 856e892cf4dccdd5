//! Run controls shared between the tick loop and whoever drives it.
//!
//! The binary hands an [`OperatorState`] to its Ctrl-C handler; tests use
//! it to stop a run from another task. Everything here is an atomic, so the
//! loop reads it between ticks without locking and a stop never lands in
//! the middle of a cycle.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// The tick cap was reached.
    MaxTicksReached,
    /// The conversation cap was reached.
    ConversationLimitReached,
    /// Someone asked the run to stop.
    OperatorStop,
}

impl fmt::Display for SimulationEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MaxTicksReached => "tick cap reached",
            Self::ConversationLimitReached => "conversation cap reached",
            Self::OperatorStop => "stopped by operator",
        })
    }
}

/// Stop flag and pacing for a run.
#[derive(Debug)]
pub struct OperatorState {
    stopping: AtomicBool,
    pace_ms: AtomicU64,
    started_at: DateTime<Utc>,
}

impl OperatorState {
    /// Controls for a run paced at `pace_ms` between ticks.
    pub fn new(pace_ms: u64) -> Self {
        Self {
            stopping: AtomicBool::new(false),
            pace_ms: AtomicU64::new(pace_ms),
            started_at: Utc::now(),
        }
    }

    /// Ask the run to stop before its next tick. Idempotent.
    pub fn request_stop(&self) {
        self.stopping.store(true, Ordering::Release);
    }

    /// Whether a stop is pending.
    pub fn is_stop_requested(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Pause between ticks, in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.pace_ms.load(Ordering::Acquire)
    }

    /// Pause between ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms())
    }

    /// Change the pause; takes effect after the current tick. Returns the
    /// old value.
    pub fn set_tick_interval(&self, interval: Duration) -> Duration {
        let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(self.pace_ms.swap(ms, Ordering::AcqRel))
    }

    /// When these controls were created.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since [`started_at`](Self::started_at).
    pub fn elapsed_seconds(&self) -> u64 {
        let secs = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(secs).unwrap_or(0)
    }
}
