//! Oracle response parsing into structured decisions.
//!
//! Replies are free text that should contain JSON. Every parser here either
//! returns a typed value or an [`OracleError::Parse`]; none of them pick a
//! fallback. The adapter owns that choice so the fallback for each phase is
//! visible in one place.

use hamlet_types::{ActionKind, PlanStatus, PlannedAction};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::OracleError;

/// Most actions taken from a numbered-list plan.
pub const MAX_PLAN_ACTIONS: usize = 4;

/// Shortest line accepted as a plan action.
pub const MIN_PLAN_LINE_CHARS: usize = 10;

/// Priority given to plan actions that carry no hint.
pub const DEFAULT_PLAN_PRIORITY: u8 = 5;

/// Reflection importance bounds.
pub const REFLECTION_IMPORTANCE: (u8, u8) = (3, 9);

/// Longest free-text reply kept, in characters.
pub const MAX_TEXT_CHARS: usize = 600;

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Whether a new plan is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningDecision {
    /// True when the agent should write a new plan.
    pub should_plan: bool,
    /// Why.
    pub reason: String,
}

/// What the agent does in the Executing phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDecision {
    /// False when the agent chose to do nothing this cycle.
    pub should_act: bool,
    /// Executing branch.
    pub kind: ActionKind,
    /// Concrete intention, such as "ask the group about fevers".
    pub intention: String,
    /// Why the agent wants to do it.
    pub motivation: String,
    /// Name or id of the agent addressed, when there is one.
    pub target: Option<String>,
}

/// Whether a childcare moment raised a concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcernJudgement {
    /// True when something is worrying.
    pub concerned: bool,
    /// What, when concerned.
    pub concern: Option<String>,
}

impl ConcernJudgement {
    /// No concern.
    pub const fn none() -> Self {
        Self {
            concerned: false,
            concern: None,
        }
    }
}

/// Whether to write a reflection, and how much it matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionDecision {
    /// True when a reflection memory should be written.
    pub should_reflect: bool,
    /// Why.
    pub reason: String,
    /// Importance for the reflection memory, within [`REFLECTION_IMPORTANCE`].
    pub importance: u8,
    /// New emotional state, when the oracle named one.
    pub emotional_state: Option<String>,
}

// ---------------------------------------------------------------------------
// Raw shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlanning {
    #[serde(default, alias = "need_plan", alias = "needs_plan")]
    should_plan: Value,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(default = "default_true")]
    should_act: Value,
    #[serde(default, alias = "type", alias = "kind", alias = "action")]
    action_type: Option<String>,
    #[serde(default, alias = "intention", alias = "intent")]
    specific_intention: Option<String>,
    #[serde(default)]
    motivation: Option<String>,
    #[serde(default, alias = "target_agent")]
    target: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawConcern {
    #[serde(default, alias = "is_concerned", alias = "worried")]
    concerned: Value,
    #[serde(default, alias = "reason")]
    concern: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReflection {
    #[serde(default)]
    should_reflect: Value,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    importance: Option<Value>,
    #[serde(default, alias = "emotion")]
    emotional_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(alias = "plan", alias = "steps")]
    actions: Vec<RawPlanAction>,
}

#[derive(Debug, Deserialize)]
struct RawPlanAction {
    #[serde(alias = "action", alias = "activity")]
    description: String,
    #[serde(default, alias = "type", alias = "action_type")]
    kind: Option<String>,
    #[serde(default)]
    priority: Option<Value>,
    #[serde(default, alias = "planned_time")]
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSelection {
    #[serde(alias = "agent_id", alias = "selected", alias = "name")]
    agent: String,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    event: Option<String>,
}

const fn default_true() -> Value {
    Value::Bool(true)
}

// ---------------------------------------------------------------------------
// Typed parsers
// ---------------------------------------------------------------------------

/// Parse a planning decision.
///
/// # Errors
///
/// [`OracleError::Parse`] when no JSON object is found or `should_plan` is
/// not a recognizable flag.
pub fn parse_planning(raw: &str) -> Result<PlanningDecision, OracleError> {
    let parsed: RawPlanning = parse_json(raw)?;
    let should_plan = as_flag(&parsed.should_plan)
        .ok_or_else(|| OracleError::Parse("should_plan is not a flag".to_owned()))?;
    Ok(PlanningDecision {
        should_plan,
        reason: non_blank(parsed.reason).unwrap_or_default(),
    })
}

/// Parse an action decision.
///
/// An unknown or missing `action_type` is classified from the intention.
///
/// # Errors
///
/// [`OracleError::Parse`] when no JSON object is found, or when the reply
/// neither names a kind nor carries an intention.
pub fn parse_action(raw: &str) -> Result<ActionDecision, OracleError> {
    let parsed: RawAction = parse_json(raw)?;
    let should_act = as_flag(&parsed.should_act).unwrap_or(true);
    let intention = non_blank(parsed.specific_intention).unwrap_or_default();
    let named = parsed
        .action_type
        .as_deref()
        .and_then(|t| t.parse::<ActionKind>().ok());
    let kind = match named {
        Some(kind) => kind,
        None if !intention.is_empty() => ActionKind::classify(&intention),
        None if !should_act => ActionKind::Rest,
        None => {
            return Err(OracleError::Parse(
                "action decision has neither a known action_type nor an intention".to_owned(),
            ));
        }
    };
    let target = parsed.target.and_then(|v| match v {
        Value::String(s) => non_blank(Some(s)).filter(|s| !is_null_word(s)),
        _ => None,
    });
    Ok(ActionDecision {
        should_act,
        kind,
        intention,
        motivation: non_blank(parsed.motivation).unwrap_or_default(),
        target,
    })
}

/// Parse a childcare concern judgement.
///
/// # Errors
///
/// [`OracleError::Parse`] when no JSON object is found or `concerned` is not
/// a recognizable flag.
pub fn parse_concern(raw: &str) -> Result<ConcernJudgement, OracleError> {
    let parsed: RawConcern = parse_json(raw)?;
    let concerned = as_flag(&parsed.concerned)
        .ok_or_else(|| OracleError::Parse("concerned is not a flag".to_owned()))?;
    let concern = non_blank(parsed.concern).filter(|c| !is_null_word(c));
    Ok(ConcernJudgement {
        concerned: concerned && concern.is_some(),
        concern: if concerned { concern } else { None },
    })
}

/// Parse a reflection decision; importance is clamped into
/// [`REFLECTION_IMPORTANCE`], defaulting to 5.
///
/// # Errors
///
/// [`OracleError::Parse`] when no JSON object is found or `should_reflect`
/// is not a recognizable flag.
pub fn parse_reflection(raw: &str) -> Result<ReflectionDecision, OracleError> {
    let parsed: RawReflection = parse_json(raw)?;
    let should_reflect = as_flag(&parsed.should_reflect)
        .ok_or_else(|| OracleError::Parse("should_reflect is not a flag".to_owned()))?;
    let (low, high) = REFLECTION_IMPORTANCE;
    let importance = parsed
        .importance
        .as_ref()
        .and_then(as_integer)
        .map_or(5, |i| clamp_u8(i, low, high));
    Ok(ReflectionDecision {
        should_reflect,
        reason: non_blank(parsed.reason).unwrap_or_default(),
        importance,
        emotional_state: non_blank(parsed.emotional_state)
            .map(|s| s.to_lowercase())
            .filter(|s| !is_null_word(s)),
    })
}

/// Parse a plan from either JSON (`{"actions": [...]}`) or a numbered list.
///
/// Numbered lines shorter than [`MIN_PLAN_LINE_CHARS`] are skipped and at
/// most [`MAX_PLAN_ACTIONS`] are taken. Priorities default to
/// [`DEFAULT_PLAN_PRIORITY`] and are clamped into `[1, 10]`.
///
/// # Errors
///
/// [`OracleError::Parse`] when neither form yields any action.
pub fn parse_plan(raw: &str) -> Result<Vec<PlannedAction>, OracleError> {
    if let Ok(plan) = parse_json::<RawPlan>(raw) {
        let actions: Vec<PlannedAction> = plan
            .actions
            .into_iter()
            .filter_map(|a| {
                let description = non_blank(Some(a.description))?;
                let kind = a
                    .kind
                    .as_deref()
                    .and_then(|k| k.parse::<ActionKind>().ok())
                    .unwrap_or_else(|| ActionKind::classify(&description));
                let priority = a
                    .priority
                    .as_ref()
                    .and_then(as_integer)
                    .map_or(DEFAULT_PLAN_PRIORITY, |p| clamp_u8(p, 1, 10));
                Some(PlannedAction {
                    description,
                    kind,
                    priority,
                    status: PlanStatus::Pending,
                    planned_time: non_blank(a.time),
                })
            })
            .take(MAX_PLAN_ACTIONS)
            .collect();
        if !actions.is_empty() {
            return Ok(actions);
        }
    }

    let lines: Vec<(bool, &str)> = raw.lines().filter_map(strip_list_marker).collect();
    // Prose around a list ("Here is my plan:") is not an action.
    let any_marked = lines.iter().any(|(marked, _)| *marked);
    let actions: Vec<PlannedAction> = lines
        .into_iter()
        .filter(|(marked, _)| *marked || !any_marked)
        .map(|(_, line)| line)
        .filter(|line| line.chars().count() >= MIN_PLAN_LINE_CHARS)
        .take(MAX_PLAN_ACTIONS)
        .map(|line| {
            let (description, priority) = split_priority_hint(line);
            PlannedAction {
                kind: ActionKind::classify(&description),
                description,
                priority: priority.unwrap_or(DEFAULT_PLAN_PRIORITY),
                status: PlanStatus::Pending,
                planned_time: None,
            }
        })
        .collect();

    if actions.is_empty() {
        Err(OracleError::Parse("no plan actions found".to_owned()))
    } else {
        Ok(actions)
    }
}

/// Pick one of `names` (parallel to `ids`) from a selection reply.
///
/// JSON `{"agent": ...}` is matched against ids then names; otherwise the
/// candidate whose id or name appears earliest in the text wins.
///
/// # Errors
///
/// [`OracleError::Parse`] when no candidate can be identified.
pub fn parse_selection(raw: &str, candidates: &[(&str, &str)]) -> Result<usize, OracleError> {
    let matches = |needle: &str, (id, name): &(&str, &str)| {
        needle.eq_ignore_ascii_case(id) || needle.eq_ignore_ascii_case(name)
    };
    if let Ok(sel) = parse_json::<RawSelection>(raw) {
        let needle = sel.agent.trim();
        if let Some(index) = candidates.iter().position(|c| matches(needle, c)) {
            return Ok(index);
        }
    }

    let haystack = raw.to_lowercase();
    candidates
        .iter()
        .enumerate()
        .filter_map(|(index, (id, name))| {
            let by_id = haystack.find(&id.to_lowercase());
            let by_name = haystack.find(&name.to_lowercase());
            by_id.into_iter().chain(by_name).min().map(|pos| (pos, index))
        })
        .min()
        .map(|(_, index)| index)
        .ok_or_else(|| OracleError::Parse("reply names no known agent".to_owned()))
}

/// Parse an optional community event; `None` when the oracle declined.
///
/// # Errors
///
/// [`OracleError::Parse`] when the reply is neither JSON nor a plain "none".
pub fn parse_event(raw: &str) -> Result<Option<String>, OracleError> {
    match parse_json::<RawEvent>(raw) {
        Ok(parsed) => Ok(non_blank(parsed.event).filter(|e| !is_null_word(e))),
        Err(err) => {
            if is_null_word(raw.trim().trim_end_matches('.')) {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

/// Clean a free-text reply: trim, drop surrounding quotes, cap the length.
///
/// # Errors
///
/// [`OracleError::EmptyResponse`] when nothing is left.
pub fn clean_text(raw: &str) -> Result<String, OracleError> {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();
    if unquoted.is_empty() {
        return Err(OracleError::EmptyResponse);
    }
    Ok(unquoted.chars().take(MAX_TEXT_CHARS).collect())
}

// ---------------------------------------------------------------------------
// JSON recovery
// ---------------------------------------------------------------------------

/// Deserialize `T` from a reply, trying progressively looser extractions:
/// the whole text, a fenced code block, the outermost `{...}` span, each
/// also with trailing commas stripped.
///
/// # Errors
///
/// [`OracleError::Parse`] when every strategy fails, or
/// [`OracleError::EmptyResponse`] for blank input.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, OracleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(OracleError::EmptyResponse);
    }

    let candidates = [
        Some(trimmed),
        extract_json_from_codeblock(trimmed),
        extract_braced(trimmed),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Ok(parsed) = serde_json::from_str::<T>(candidate) {
            return Ok(parsed);
        }
        if let Ok(parsed) = serde_json::from_str::<T>(&strip_trailing_commas(candidate)) {
            return Ok(parsed);
        }
    }

    Err(OracleError::Parse(format!(
        "all parse strategies failed for: {}",
        trimmed.chars().take(200).collect::<String>()
    )))
}

/// Body of the first fenced code block (```` ```json ```` or plain).
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let (_, after_fence) = text.split_once("```")?;
    let body = match after_fence.split_once('\n') {
        Some((tag, rest)) if !tag.trim_start().starts_with('{') => rest,
        _ => after_fence,
    };
    let (inner, _) = body.split_once("```")?;
    Some(inner.trim())
}

/// From the first `{` to the last `}`.
fn extract_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Drop commas that directly precede `}` or `]` (a common LLM slip).
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            let rest: String = chars.clone().skip_while(|n| n.is_whitespace()).take(1).collect();
            if rest == "}" || rest == "]" {
                continue;
            }
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Interpret a JSON value as a yes/no flag.
fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interpret a JSON value as an integer (numbers, numeric strings).
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round()).and_then(f64_to_i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn f64_to_i64(value: f64) -> Option<i64> {
    (value.is_finite() && value.abs() < 1e15).then_some(value as i64)
}

fn clamp_u8(value: i64, low: u8, high: u8) -> u8 {
    u8::try_from(value.clamp(i64::from(low), i64::from(high))).unwrap_or(high)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn is_null_word(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "null" | "none" | "nobody" | "n/a" | "nothing" | "no" | "no event"
    )
}

/// Strip `1.`, `2)`, `-`, `*` or `•` list markers, reporting whether one
/// was present; `None` for blank lines.
fn strip_list_marker(line: &str) -> Option<(bool, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let without_digits = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
    let stripped = if without_digits.len() < trimmed.len() {
        without_digits.strip_prefix(['.', ')', ':'])
    } else {
        trimmed.strip_prefix(['-', '*', '•'])
    };
    let (marked, text) = stripped.map_or((false, trimmed), |rest| (true, rest.trim()));
    (!text.is_empty()).then_some((marked, text))
}

/// Split a trailing `priority: 8` / `(priority 8)` hint off a plan line.
fn split_priority_hint(line: &str) -> (String, Option<u8>) {
    let lower = line.to_ascii_lowercase();
    let Some(pos) = lower.find("priority") else {
        return (line.to_owned(), None);
    };
    let digits: String = lower
        .get(pos..)
        .unwrap_or_default()
        .trim_start_matches("priority")
        .trim_start_matches([':', '=', ' '])
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let priority = digits.parse::<i64>().ok().map(|p| clamp_u8(p, 1, 10));
    let description = line
        .get(..pos)
        .unwrap_or(line)
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '(' | '-' | ',' | '[' | '|'))
        .to_owned();
    if description.is_empty() {
        (line.to_owned(), priority)
    } else {
        (description, priority)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn planning_direct_json() {
        let d = parse_planning(r#"{"should_plan": true, "reason": "new day"}"#).unwrap();
        assert!(d.should_plan);
        assert_eq!(d.reason, "new day");
    }

    #[test]
    fn planning_from_codeblock_with_prose() {
        let raw = "Sure! Here you go:\n```json\n{\"should_plan\": \"no\", \"reason\": \"plan is fine\",}\n```\nHope that helps.";
        let d = parse_planning(raw).unwrap();
        assert!(!d.should_plan);
    }

    #[test]
    fn planning_prose_is_an_error() {
        assert!(matches!(
            parse_planning("I think I should plan my day."),
            Err(OracleError::Parse(_))
        ));
        assert!(matches!(parse_planning("   "), Err(OracleError::EmptyResponse)));
    }

    #[test]
    fn action_full_payload() {
        let raw = r#"{"should_act": true, "action_type": "conversation",
            "specific_intention": "ask Wang Fang about fevers",
            "motivation": "Xiaoyu feels warm", "target": "Wang Fang"}"#;
        let d = parse_action(raw).unwrap();
        assert!(d.should_act);
        assert_eq!(d.kind, ActionKind::Conversation);
        assert_eq!(d.target.as_deref(), Some("Wang Fang"));
    }

    #[test]
    fn action_snake_case_kind_and_null_target() {
        let raw = r#"{"action_type": "digital_activity", "specific_intention": "watch cooking videos", "target": null}"#;
        let d = parse_action(raw).unwrap();
        assert_eq!(d.kind, ActionKind::DigitalActivity);
        assert!(d.target.is_none());
    }

    #[test]
    fn action_unknown_kind_is_classified_from_intention() {
        let raw = r#"{"action_type": "socialize", "specific_intention": "chat with the group about school"}"#;
        assert_eq!(parse_action(raw).unwrap().kind, ActionKind::Conversation);
    }

    #[test]
    fn action_without_kind_or_intention_fails() {
        assert!(parse_action(r#"{"motivation": "bored"}"#).is_err());
    }

    #[test]
    fn concern_yes_and_no() {
        let yes = parse_concern(r#"{"concerned": true, "concern": "a slight fever"}"#).unwrap();
        assert!(yes.concerned);
        assert_eq!(yes.concern.as_deref(), Some("a slight fever"));

        let no = parse_concern(r#"{"concerned": false, "concern": null}"#).unwrap();
        assert_eq!(no, ConcernJudgement::none());

        // Concerned without saying about what is not actionable.
        let vague = parse_concern(r#"{"concerned": true}"#).unwrap();
        assert!(!vague.concerned);
    }

    #[test]
    fn reflection_importance_is_clamped() {
        let high = parse_reflection(r#"{"should_reflect": true, "importance": 12}"#).unwrap();
        assert_eq!(high.importance, 9);
        let low = parse_reflection(r#"{"should_reflect": true, "importance": "1"}"#).unwrap();
        assert_eq!(low.importance, 3);
        let missing = parse_reflection(r#"{"should_reflect": false}"#).unwrap();
        assert_eq!(missing.importance, 5);
    }

    #[test]
    fn reflection_emotion_normalized() {
        let d = parse_reflection(
            r#"{"should_reflect": true, "reason": "busy day", "emotional_state": " Hopeful "}"#,
        )
        .unwrap();
        assert_eq!(d.emotional_state.as_deref(), Some("hopeful"));
    }

    #[test]
    fn plan_from_json() {
        let raw = r#"{"actions": [
            {"description": "Take Xiaoyu to the park", "kind": "childcare", "priority": 8, "time": "afternoon"},
            {"description": "Share a recipe in the group", "priority": 15}
        ]}"#;
        let actions = parse_plan(raw).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, ActionKind::Childcare);
        assert_eq!(actions[0].planned_time.as_deref(), Some("afternoon"));
        assert_eq!(actions[1].priority, 10);
        assert_eq!(actions[1].kind, ActionKind::Conversation);
    }

    #[test]
    fn plan_from_numbered_lines() {
        let raw = "Here is my plan:\n1. Check on the kids after school (priority: 8)\n2) ok\n3. Watch a video about budgeting\n- Read a chapter on parenting, priority 12\n4. Chat with the neighbours\n5. Take a long nap this evening";
        let actions = parse_plan(raw).unwrap();
        assert_eq!(actions.len(), MAX_PLAN_ACTIONS);
        assert_eq!(actions[0].description, "Check on the kids after school");
        assert_eq!(actions[0].priority, 8);
        assert_eq!(actions[0].kind, ActionKind::Childcare);
        assert_eq!(actions[1].priority, DEFAULT_PLAN_PRIORITY);
        assert_eq!(actions[1].kind, ActionKind::DigitalActivity);
        assert_eq!(actions[2].description, "Read a chapter on parenting");
        assert_eq!(actions[2].priority, 10);
        assert_eq!(actions[2].kind, ActionKind::Learning);
        assert_eq!(actions[3].kind, ActionKind::Conversation);
    }

    #[test]
    fn plan_from_unmarked_lines() {
        let raw = "Visit the market for vegetables\nCall my mother this evening";
        let actions = parse_plan(raw).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].kind, ActionKind::Conversation);
    }

    #[test]
    fn plan_from_garbage_fails() {
        assert!(parse_plan("ok\nsure\n").is_err());
        assert!(parse_plan(r#"{"actions": []}"#).is_err());
    }

    #[test]
    fn selection_by_json_id_or_name() {
        let candidates = [("li_mei", "Li Mei"), ("wang_fang", "Wang Fang")];
        assert_eq!(parse_selection(r#"{"agent": "wang_fang"}"#, &candidates).unwrap(), 1);
        assert_eq!(parse_selection(r#"{"agent": "li mei"}"#, &candidates).unwrap(), 0);
    }

    #[test]
    fn selection_by_earliest_mention() {
        let candidates = [("li_mei", "Li Mei"), ("wang_fang", "Wang Fang")];
        let raw = "Wang Fang has been idle longest, though Li Mei is also free.";
        assert_eq!(parse_selection(raw, &candidates).unwrap(), 1);
        assert!(parse_selection("Nobody in particular.", &candidates).is_err());
    }

    #[test]
    fn event_forms() {
        assert_eq!(
            parse_event(r#"{"event": "A storm is coming tonight"}"#).unwrap().as_deref(),
            Some("A storm is coming tonight")
        );
        assert_eq!(parse_event(r#"{"event": null}"#).unwrap(), None);
        assert_eq!(parse_event("None.").unwrap(), None);
        assert!(parse_event("Maybe a parade?").is_err());
    }

    #[test]
    fn clean_text_strips_quotes_and_caps_length() {
        assert_eq!(clean_text("  \"Hello all!\" ").unwrap(), "Hello all!");
        assert!(matches!(clean_text("  "), Err(OracleError::EmptyResponse)));
        let long = "a".repeat(MAX_TEXT_CHARS + 50);
        assert_eq!(clean_text(&long).unwrap().chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn extract_json_from_markdown() {
        assert_eq!(
            extract_json_from_codeblock("```json\n{\"key\": \"value\"}\n```"),
            Some("{\"key\": \"value\"}")
        );
        assert_eq!(
            extract_json_from_codeblock("```\n{\"key\": \"value\"}\n```"),
            Some("{\"key\": \"value\"}")
        );
    }

    #[test]
    fn strip_trailing_commas_basic() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1, "b": 2,}"#), r#"{"a": 1, "b": 2}"#);
        assert_eq!(strip_trailing_commas("[1, 2, 3,\n]"), "[1, 2, 3\n]");
    }
}
