//! Configuration loading and typed config structures for the Hamlet
//! simulation.
//!
//! The canonical configuration lives in `hamlet-config.yaml` in the working
//! directory. Every field has a default, so a missing file or a partial file
//! is fine. After parsing, environment overrides are applied and the result
//! is validated; any failure here is a startup-fatal [`ConfigError`].

use std::path::{Path, PathBuf};

use hamlet_agents::RuntimeConfig;
use hamlet_oracle::OracleConfig;
use hamlet_store::RetentionPolicy;
use serde::Deserialize;

use crate::clock::ClockMode;
use crate::decision::{DecisionMode, SelectionPolicy};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file or directory being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of range or inconsistent.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },

    /// The selected oracle backend has no credential.
    #[error("missing credential: set {var} for the {backend} backend")]
    MissingCredential {
        /// Environment variable that should hold the credential.
        var: &'static str,
        /// Backend that needs it.
        backend: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl ConfigError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Top-level configuration, mirroring `hamlet-config.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HamletConfig {
    /// Run bounds and scheduling.
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Simulated or wall-clock time.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Selection, planning and reflection strategies.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Per-agent runtime state parameters.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Memory and plan retention.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Entity store location.
    #[serde(default)]
    pub store: StoreSection,

    /// Oracle backend.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Agent roster location.
    #[serde(default)]
    pub agents: RosterConfig,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HamletConfig {
    /// Parse configuration from a YAML string. No overrides, no validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML for
    /// this structure.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Read and parse a YAML file. No overrides, no validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Load the configuration used at startup: the file if it exists (the
    /// defaults otherwise), then environment overrides, then validation.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; all of them are fatal at startup.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// - `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` -- credential for the
    ///   selected backend
    /// - `OPENAI_MODEL` -- `oracle.model`
    /// - `HAMLET_DATABASE_PATH` -- `store.database_path`
    /// - `HAMLET_MAX_TICKS` -- `simulation.max_ticks`
    /// - `HAMLET_MAX_CONVERSATIONS` -- `simulation.max_conversations`
    ///   (`none` removes the cap)
    /// - `LOG_LEVEL` -- `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric override does not
    /// parse.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(var) = self.oracle.backend.credential_var()
            && let Some(key) = get(var)
        {
            self.oracle.api_key = Some(key);
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.oracle.model = model;
        }
        if let Some(path) = get("HAMLET_DATABASE_PATH") {
            self.store.database_path = PathBuf::from(path);
        }
        if let Some(raw) = get("HAMLET_MAX_TICKS") {
            self.simulation.max_ticks = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(format!("HAMLET_MAX_TICKS={raw}: {e}")))?;
        }
        if let Some(raw) = get("HAMLET_MAX_CONVERSATIONS") {
            self.simulation.max_conversations = if raw.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(raw.trim().parse().map_err(|e| {
                    ConfigError::invalid(format!("HAMLET_MAX_CONVERSATIONS={raw}: {e}"))
                })?)
            };
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Check ranges and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field, or
    /// [`ConfigError::MissingCredential`] when the oracle backend has no key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.max_ticks == 0 {
            return Err(ConfigError::invalid("simulation.max_ticks must be at least 1"));
        }
        if self.clock.start_hour > 23 {
            return Err(ConfigError::invalid(format!(
                "clock.start_hour must be within 0..=23, got {}",
                self.clock.start_hour
            )));
        }
        if self.clock.hours_per_tick == 0 || self.clock.hours_per_tick > 24 {
            return Err(ConfigError::invalid(format!(
                "clock.hours_per_tick must be within 1..=24, got {}",
                self.clock.hours_per_tick
            )));
        }
        for (name, p) in [
            ("policy.plan_probability", self.policy.plan_probability),
            ("policy.reflect_probability", self.policy.reflect_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::invalid(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        self.retention
            .policy()
            .validate()
            .map_err(|e| ConfigError::invalid(e.to_string()))?;
        self.runtime
            .validate()
            .map_err(|e| ConfigError::invalid(e.to_string()))?;
        self.oracle
            .validate()
            .map_err(|e| ConfigError::invalid(e.to_string()))?;

        if let Some(var) = self.oracle.backend.credential_var()
            && self
                .oracle
                .api_key
                .as_deref()
                .is_none_or(|k| k.trim().is_empty())
        {
            return Err(ConfigError::MissingCredential {
                var,
                backend: format!("{:?}", self.oracle.backend).to_lowercase(),
            });
        }
        Ok(())
    }
}

/// Run bounds and scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSection {
    /// Hard cap on ticks.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Hard cap on conversations; `null` for none.
    #[serde(default = "default_max_conversations")]
    pub max_conversations: Option<u64>,

    /// Delay between ticks in milliseconds.
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Seed for threshold policies and topic picks.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Ticks between global-event checks; 0 disables them.
    #[serde(default = "default_global_event_interval")]
    pub global_event_interval: u64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            max_conversations: default_max_conversations(),
            tick_interval_ms: 0,
            seed: default_seed(),
            global_event_interval: default_global_event_interval(),
        }
    }
}

/// Clock settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Simulated or wall-clock hours.
    #[serde(default)]
    pub mode: ClockMode,

    /// Hour at tick 0 in simulated mode.
    #[serde(default = "default_start_hour")]
    pub start_hour: u8,

    /// Simulated hours that pass per tick.
    #[serde(default = "default_hours_per_tick")]
    pub hours_per_tick: u8,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            mode: ClockMode::default(),
            start_hour: default_start_hour(),
            hours_per_tick: default_hours_per_tick(),
        }
    }
}

/// Decision strategies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PolicyConfig {
    /// How agents are chosen each tick.
    #[serde(default)]
    pub selection: SelectionPolicy,

    /// How the planning decision is made.
    #[serde(default)]
    pub planning: DecisionMode,

    /// How the reflection decision is made.
    #[serde(default)]
    pub reflection: DecisionMode,

    /// Chance of replanning under the threshold policy.
    #[serde(default = "default_plan_probability")]
    pub plan_probability: f64,

    /// Chance of reflecting under the threshold policy.
    #[serde(default = "default_reflect_probability")]
    pub reflect_probability: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            selection: SelectionPolicy::default(),
            planning: DecisionMode::default(),
            reflection: DecisionMode::default(),
            plan_probability: default_plan_probability(),
            reflect_probability: default_reflect_probability(),
        }
    }
}

/// Memory and plan retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetentionConfig {
    /// Eviction runs once an agent has more memories than this.
    #[serde(default = "default_high_water")]
    pub high_water: usize,

    /// Memories kept after eviction.
    #[serde(default = "default_retain")]
    pub retain: usize,

    /// Superseded plans kept per agent by the daily prune.
    #[serde(default = "default_plans_kept")]
    pub plans_kept: u32,
}

impl RetentionConfig {
    /// The store-level eviction policy.
    pub const fn policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            high_water: self.high_water,
            retain: self.retain,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            high_water: default_high_water(),
            retain: default_retain(),
            plans_kept: default_plans_kept(),
        }
    }
}

/// Entity store location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSection {
    /// `SQLite` database file, created if missing.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Agent roster location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Directory of `*.json` agent profiles.
    #[serde(default = "default_roster_dir")]
    pub roster_dir: PathBuf,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            roster_dir: default_roster_dir(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

const fn default_max_ticks() -> u64 {
    100
}

#[allow(clippy::unnecessary_wraps)]
const fn default_max_conversations() -> Option<u64> {
    Some(50)
}

const fn default_seed() -> u64 {
    42
}

const fn default_global_event_interval() -> u64 {
    10
}

const fn default_start_hour() -> u8 {
    8
}

const fn default_hours_per_tick() -> u8 {
    1
}

const fn default_plan_probability() -> f64 {
    0.3
}

const fn default_reflect_probability() -> f64 {
    0.2
}

const fn default_high_water() -> usize {
    hamlet_store::retention::DEFAULT_HIGH_WATER
}

const fn default_retain() -> usize {
    hamlet_store::retention::DEFAULT_RETAIN
}

const fn default_plans_kept() -> u32 {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from("memory/hamlet.sqlite")
}

fn default_roster_dir() -> PathBuf {
    PathBuf::from("agents")
}

fn default_log_level() -> String {
    "info".to_owned()
}
