//! Agent profiles.
//!
//! A profile is the immutable persona of a community member: who they are,
//! what they worry about, when they are awake, and how readily they speak
//! up. Profiles are loaded from roster files and validated before they are
//! registered.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::{Validate, ValidationError};

use crate::enums::ActionKind;
use crate::ids::AgentId;

/// Hours an agent is active when the profile does not say otherwise.
fn default_active_hours() -> Vec<u8> {
    (6..=22).collect()
}

const fn default_response_probability() -> f64 {
    0.6
}

const fn default_initiative_level() -> f64 {
    0.5
}

const fn default_help_seeking_threshold() -> u8 {
    5
}

/// Full persona of a simulated community member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentProfile {
    /// Stable key, unique across the roster.
    #[validate(custom(function = "validate_agent_id"))]
    pub id: AgentId,
    /// Display name used in prompts and logs.
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    /// Age in years.
    #[validate(range(min = 15, max = 80))]
    pub age: u8,
    /// Family or community role, e.g. "young mother" or "grandmother".
    #[validate(length(min = 1))]
    pub role: String,
    /// Highest education, free text.
    #[serde(default)]
    pub education: Option<String>,
    /// Children the agent looks after.
    #[serde(default)]
    #[validate(nested)]
    pub children: Vec<Child>,
    /// Traits, interests, and digital habits.
    #[serde(default)]
    pub personality: Personality,
    /// Standing worries.
    #[serde(default)]
    pub concerns: Vec<String>,
    /// Topics the agent wants to learn about.
    #[serde(default)]
    pub learning_interests: Vec<String>,
    /// Hours (0-23) during which the agent is eligible to act.
    #[serde(default = "default_active_hours")]
    #[validate(custom(function = "validate_active_hours"))]
    pub active_hours: Vec<u8>,
    /// Probability of replying when addressed.
    #[serde(default = "default_response_probability")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub response_probability: f64,
    /// Probability of acting unprompted.
    #[serde(default = "default_initiative_level")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub initiative_level: f64,
    /// How worried the agent must be (1-10) before asking for help.
    #[serde(default = "default_help_seeking_threshold")]
    #[validate(range(min = 1, max = 10))]
    pub help_seeking_threshold: u8,
}

/// A child in the agent's care.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Child {
    /// First name or nickname.
    #[validate(length(min = 1))]
    pub name: String,
    /// Age in years.
    #[validate(range(max = 18))]
    pub age: u8,
    /// Free-text gender.
    #[serde(default)]
    pub gender: Option<String>,
}

/// Personality and habits that color prompts and topic choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Personality {
    /// Adjectives such as "caring" or "anxious".
    #[serde(default)]
    pub traits: Vec<String>,
    /// General interests.
    #[serde(default)]
    pub interests: Vec<String>,
    /// How the agent tends to speak.
    #[serde(default)]
    pub communication_style: Option<String>,
    /// Apps and media the agent uses.
    #[serde(default)]
    pub digital_habits: DigitalHabits,
}

/// Apps, platforms, and content preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DigitalHabits {
    /// Installed apps.
    #[serde(default)]
    pub apps: Vec<String>,
    /// Kinds of videos the agent watches.
    #[serde(default)]
    pub video_preferences: Vec<String>,
    /// Platforms in order of preference.
    #[serde(default)]
    pub preferred_platforms: Vec<String>,
}

impl AgentProfile {
    /// Whether the agent is awake at the given hour.
    pub fn is_active_at(&self, hour: u8) -> bool {
        self.active_hours.contains(&hour)
    }

    /// Whether the agent has anyone to look after.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether a step of `kind` means anything for this agent. Childcare
    /// needs a child.
    pub fn can_do(&self, kind: ActionKind) -> bool {
        kind != ActionKind::Childcare || self.has_children()
    }

    /// One-line persona used when the oracle chooses between agents.
    pub fn summary(&self) -> String {
        let traits = if self.personality.traits.is_empty() {
            "no notable traits".to_owned()
        } else {
            self.personality.traits.join(", ")
        };
        format!("{}, {} aged {}, {}", self.name, self.role, self.age, traits)
    }
}

/// Reject blank agent ids.
fn validate_agent_id(id: &AgentId) -> Result<(), ValidationError> {
    if id.is_blank() {
        return Err(ValidationError::new("blank_agent_id"));
    }
    Ok(())
}

/// Reject hours outside 0-23.
#[allow(clippy::ptr_arg)]
fn validate_active_hours(hours: &Vec<u8>) -> Result<(), ValidationError> {
    if hours.iter().any(|h| *h > 23) {
        return Err(ValidationError::new("hour_out_of_range"));
    }
    Ok(())
}
