//! Tick callback that writes a one-line summary per tick.

use hamlet_core::{SimulationState, TickCallback, TickSummary};
use tracing::info;

/// Logs each tick and keeps a running count of ticks with conversations.
#[derive(Debug, Default)]
pub struct TickLogger {
    chatty_ticks: u64,
}

impl TickLogger {
    /// Create a logger.
    pub const fn new() -> Self {
        Self { chatty_ticks: 0 }
    }

    /// Ticks that produced at least one conversation.
    pub const fn chatty_ticks(&self) -> u64 {
        self.chatty_ticks
    }
}

impl TickCallback for TickLogger {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        if summary.conversations > 0 {
            self.chatty_ticks = self.chatty_ticks.saturating_add(1);
        }
        info!(
            tick = summary.tick,
            day = summary.day,
            hour = summary.hour,
            time_of_day = %summary.time_of_day,
            acted = summary.acted.len(),
            failed = summary.failed.len(),
            conversations = summary.conversations,
            total_conversations = state.conversation_count,
            event = summary.global_event.as_deref().unwrap_or("-"),
            "Tick complete"
        );
    }
}
