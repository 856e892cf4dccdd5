//! Closed vocabularies for the simulation.
//!
//! Every enum here is persisted as a short kebab-case string, so each one
//! carries a lossless `as_str` / [`FromStr`] pair in addition to its serde
//! representation.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when a stored or parsed string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {vocabulary}: {value}")]
pub struct ParseKindError {
    /// Which vocabulary was being parsed.
    pub vocabulary: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Implements `as_str`, [`FromStr`], and [`Display`](core::fmt::Display)
/// from a single variant-to-string table.
macro_rules! string_enum {
    ($name:ident, $vocabulary:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable string form used in storage and prompts.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseKindError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
                match normalized.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseKindError {
                        vocabulary: $vocabulary,
                        value: s.to_owned(),
                    }),
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Memory kinds
// ---------------------------------------------------------------------------

/// What a stored memory records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum MemoryKind {
    /// Something noticed during the observing phase.
    Observation,
    /// A newly formed plan.
    Plan,
    /// An action the agent carried out.
    Action,
    /// A reflection over recent memories.
    Reflection,
    /// The agent's own record of something it said.
    ConversationEcho,
    /// Knowledge picked up from content or study.
    Learning,
    /// A worry, usually about a child.
    Concern,
    /// Progress on a planned action.
    PlanUpdate,
    /// End-of-day summary of experiences.
    ExperienceSummary,
    /// Distilled advice drawn from many experiences.
    Wisdom,
}

string_enum!(MemoryKind, "memory kind", {
    Observation => "observation",
    Plan => "plan",
    Action => "action",
    Reflection => "reflection",
    ConversationEcho => "conversation-echo",
    Learning => "learning",
    Concern => "concern",
    PlanUpdate => "plan-update",
    ExperienceSummary => "experience-summary",
    Wisdom => "wisdom",
});

// ---------------------------------------------------------------------------
// Conversation kinds
// ---------------------------------------------------------------------------

/// The register of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum ConversationKind {
    /// Broadcast chatter to the whole community.
    GroupChat,
    /// A message directed at one agent.
    PrivateChat,
    /// A request for help, usually triggered by a concern.
    HelpRequest,
    /// Advice offered to someone else.
    Advice,
    /// Sharing a video, article, or other content.
    ContentSharing,
}

string_enum!(ConversationKind, "conversation kind", {
    GroupChat => "group-chat",
    PrivateChat => "private-chat",
    HelpRequest => "help-request",
    Advice => "advice",
    ContentSharing => "content-sharing",
});

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

/// The closed set of things an agent can do in its executing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionKind {
    /// Say something to the community or to one agent.
    Conversation,
    /// Browse a video or social platform.
    DigitalActivity,
    /// Look after a child.
    Childcare,
    /// Study a topic of interest.
    Learning,
    /// Do nothing and recover energy.
    Rest,
}

string_enum!(ActionKind, "action kind", {
    Conversation => "conversation",
    DigitalActivity => "digital-activity",
    Childcare => "childcare",
    Learning => "learning",
    Rest => "rest",
});

impl ActionKind {
    /// Classify free text by whole-word keyword, used only for plan lines
    /// that carry no explicit kind.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let has = |words: &[&str]| tokens.iter().any(|t| words.contains(t));
        if has(&[
            "child", "children", "kid", "kids", "baby", "babies", "son", "sons", "daughter",
            "daughters", "grandchild", "grandchildren", "grandson", "granddaughter", "toddler",
        ]) {
            Self::Childcare
        } else if has(&[
            "chat", "chats", "chatting", "talk", "talks", "talking", "share", "sharing", "ask",
            "asking", "group", "message", "messages", "call", "calling",
        ]) {
            Self::Conversation
        } else if has(&[
            "video", "videos", "app", "apps", "scroll", "scrolling", "watch", "watching",
            "browse", "browsing", "online",
        ]) {
            Self::DigitalActivity
        } else if has(&[
            "learn", "learning", "study", "studying", "read", "reading", "course", "courses",
            "research",
        ]) {
            Self::Learning
        } else {
            Self::Rest
        }
    }
}

// ---------------------------------------------------------------------------
// Plan status
// ---------------------------------------------------------------------------

/// Advisory progress marker on a planned action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum PlanStatus {
    /// Not started.
    #[default]
    Pending,
    /// Picked up but not finished.
    InProgress,
    /// Done.
    Completed,
}

string_enum!(PlanStatus, "plan status", {
    Pending => "pending",
    InProgress => "in-progress",
    Completed => "completed",
});

// ---------------------------------------------------------------------------
// Time of day
// ---------------------------------------------------------------------------

/// Coarse time-of-day label derived from the hour.
///
/// The hour partition is fixed; only the human wording returned by
/// [`TimeOfDay::describe`] is presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum TimeOfDay {
    /// 05:00 to 06:59.
    EarlyMorning,
    /// 07:00 to 08:59.
    Morning,
    /// 09:00 to 10:59.
    LateMorning,
    /// 11:00 to 12:59.
    NearNoon,
    /// 13:00 to 14:59.
    EarlyAfternoon,
    /// 15:00 to 16:59.
    AfternoonTea,
    /// 17:00 to 18:59.
    Evening,
    /// 19:00 to 20:59.
    Night,
    /// 21:00 to 22:59.
    LateNight,
    /// 23:00 to 04:59.
    DeepNight,
}

string_enum!(TimeOfDay, "time of day", {
    EarlyMorning => "early-morning",
    Morning => "morning",
    LateMorning => "late-morning",
    NearNoon => "near-noon",
    EarlyAfternoon => "early-afternoon",
    AfternoonTea => "afternoon-tea",
    Evening => "evening",
    Night => "night",
    LateNight => "late-night",
    DeepNight => "deep-night",
});

impl TimeOfDay {
    /// Map an hour of the day (0-23) to its label. Hours past 23 are
    /// deep night.
    pub const fn from_hour(hour: u8) -> Self {
        match hour {
            5..=6 => Self::EarlyMorning,
            7..=8 => Self::Morning,
            9..=10 => Self::LateMorning,
            11..=12 => Self::NearNoon,
            13..=14 => Self::EarlyAfternoon,
            15..=16 => Self::AfternoonTea,
            17..=18 => Self::Evening,
            19..=20 => Self::Night,
            21..=22 => Self::LateNight,
            _ => Self::DeepNight,
        }
    }

    /// Short scene-setting sentence for prompts.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::EarlyMorning => "early morning, the household is just waking up",
            Self::Morning => "morning, breakfast and getting the children ready",
            Self::LateMorning => "late morning, a quieter stretch with time for the phone",
            Self::NearNoon => "close to noon, lunch needs preparing",
            Self::EarlyAfternoon => "early afternoon, nap time for the little ones",
            Self::AfternoonTea => "mid afternoon, time for tea and a short video or two",
            Self::Evening => "evening, cooking dinner and busy with family",
            Self::Night => "night, the family is together after dinner",
            Self::LateNight => "late night, winding down and scrolling before bed",
            Self::DeepNight => "deep night, everyone should be asleep",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hour_partition_matches_label_table() {
        let expected = [
            (0, TimeOfDay::DeepNight),
            (4, TimeOfDay::DeepNight),
            (5, TimeOfDay::EarlyMorning),
            (6, TimeOfDay::EarlyMorning),
            (7, TimeOfDay::Morning),
            (8, TimeOfDay::Morning),
            (9, TimeOfDay::LateMorning),
            (10, TimeOfDay::LateMorning),
            (11, TimeOfDay::NearNoon),
            (12, TimeOfDay::NearNoon),
            (13, TimeOfDay::EarlyAfternoon),
            (14, TimeOfDay::EarlyAfternoon),
            (15, TimeOfDay::AfternoonTea),
            (16, TimeOfDay::AfternoonTea),
            (17, TimeOfDay::Evening),
            (18, TimeOfDay::Evening),
            (19, TimeOfDay::Night),
            (20, TimeOfDay::Night),
            (21, TimeOfDay::LateNight),
            (22, TimeOfDay::LateNight),
            (23, TimeOfDay::DeepNight),
        ];
        for (hour, label) in expected {
            assert_eq!(TimeOfDay::from_hour(hour), label, "hour {hour}");
        }
    }

    #[test]
    fn memory_kind_string_round_trip() {
        for kind in MemoryKind::ALL {
            assert_eq!(kind.as_str().parse::<MemoryKind>().unwrap(), *kind);
        }
        assert_eq!("conversation_echo".parse::<MemoryKind>().unwrap(), MemoryKind::ConversationEcho);
        assert!("gossip".parse::<MemoryKind>().is_err());
    }

    #[test]
    fn serde_and_storage_forms_agree() {
        let json = serde_json::to_string(&ConversationKind::HelpRequest).unwrap();
        assert_eq!(json, format!("\"{}\"", ConversationKind::HelpRequest.as_str()));
    }

    #[test]
    fn classify_plan_lines() {
        assert_eq!(ActionKind::classify("Check on the baby's rash"), ActionKind::Childcare);
        assert_eq!(ActionKind::classify("Chat with the group about dinner"), ActionKind::Conversation);
        assert_eq!(ActionKind::classify("Watch a cooking video"), ActionKind::DigitalActivity);
        assert_eq!(ActionKind::classify("Study first aid basics"), ActionKind::Learning);
        assert_eq!(ActionKind::classify("Nap"), ActionKind::Rest);
    }

    #[test]
    fn classify_ignores_words_that_only_share_a_prefix() {
        assert_eq!(ActionKind::classify("Hum a song"), ActionKind::Rest);
        assert_eq!(ActionKind::classify("Buy apples"), ActionKind::Rest);
        assert_eq!(ActionKind::classify("Go to the appointment"), ActionKind::Rest);
        assert_eq!(ActionKind::classify("Get ready for bed"), ActionKind::Rest);
        assert_eq!(ActionKind::classify("Reading with my grandson"), ActionKind::Childcare);
    }
}
