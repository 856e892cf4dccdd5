//! Tunable parameters for per-agent runtime state.

use serde::Deserialize;

use crate::error::AgentError;

/// Configuration for [`RuntimeState`](crate::runtime::RuntimeState).
///
/// Deserialized from the `runtime` section of `hamlet-config.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RuntimeConfig {
    /// Recent conversations kept before the window is trimmed (default: 20).
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    /// Size the window is trimmed back to once it overflows (default: 15).
    #[serde(default = "default_recent_trim_to")]
    pub recent_trim_to: usize,

    /// Energy a newly registered agent starts with (default: 7).
    #[serde(default = "default_energy")]
    pub default_energy: u8,

    /// Energy regained by resting (default: 2).
    #[serde(default = "default_rest_recovery")]
    pub rest_recovery: u8,

    /// Energy spent by any other action (default: 1).
    #[serde(default = "default_action_cost")]
    pub action_cost: u8,
}

const fn default_recent_window() -> usize {
    20
}

const fn default_recent_trim_to() -> usize {
    15
}

const fn default_energy() -> u8 {
    7
}

const fn default_rest_recovery() -> u8 {
    2
}

const fn default_action_cost() -> u8 {
    1
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            recent_window: default_recent_window(),
            recent_trim_to: default_recent_trim_to(),
            default_energy: default_energy(),
            rest_recovery: default_rest_recovery(),
            action_cost: default_action_cost(),
        }
    }
}

impl RuntimeConfig {
    /// Check that the window sizes and energy bounds are coherent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.recent_window == 0 {
            return Err(AgentError::InvalidConfig("recent_window must be positive".to_owned()));
        }
        if self.recent_trim_to > self.recent_window {
            return Err(AgentError::InvalidConfig(format!(
                "recent_trim_to ({}) exceeds recent_window ({})",
                self.recent_trim_to, self.recent_window
            )));
        }
        if !(1..=10).contains(&self.default_energy) {
            return Err(AgentError::InvalidConfig(format!(
                "default_energy {} is outside 1..=10",
                self.default_energy
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_energy, 7);
        assert_eq!(config.recent_window, 20);
    }

    #[test]
    fn trim_larger_than_window_is_rejected() {
        let config = RuntimeConfig {
            recent_trim_to: 30,
            ..RuntimeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
