//! Oracle configuration: which backend, where it lives, and call limits.
//!
//! Deserialized from the `oracle` section of `hamlet-config.yaml`. The
//! credential is never read from YAML; the loader fills `api_key` from the
//! variable named by [`BackendType::credential_var`].

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::OracleError;

/// Supported oracle backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions API.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// No oracle; every request fails and the fallback path runs.
    Offline,
}

impl BackendType {
    /// Environment variable holding the credential, if the backend needs one.
    pub const fn credential_var(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Offline => None,
        }
    }

    /// Base URL used when the config does not name one.
    pub const fn default_api_url(self) -> &'static str {
        match self {
            Self::OpenAi | Self::Offline => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }
}

/// The `oracle` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Backend to use.
    #[serde(default = "default_backend")]
    pub backend: BackendType,
    /// Base API URL; defaults per backend.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-call deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Directory of template overrides (`*.j2`), layered over the built-ins.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
    /// Credential, filled from the environment after parsing.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            api_url: None,
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            templates_dir: None,
            api_key: None,
        }
    }
}

impl OracleConfig {
    /// Per-call deadline.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Configured base URL, or the backend default.
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or(self.backend.default_api_url())
    }

    /// Check numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), OracleError> {
        if self.timeout_ms == 0 {
            return Err(OracleError::Config("oracle.timeout_ms must be > 0".to_owned()));
        }
        if self.max_tokens == 0 {
            return Err(OracleError::Config("oracle.max_tokens must be > 0".to_owned()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(OracleError::Config(format!(
                "oracle.temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.model.trim().is_empty() {
            return Err(OracleError::Config("oracle.model must not be empty".to_owned()));
        }
        Ok(())
    }
}

const fn default_backend() -> BackendType {
    BackendType::OpenAi
}

fn default_model() -> String {
    "gpt-4o-mini".to_owned()
}

const fn default_timeout_ms() -> u64 {
    15_000
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    512
}
