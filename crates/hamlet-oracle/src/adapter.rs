//! The boundary the cycle talks to: one method per decision or piece of
//! content, each returning either the oracle's structured answer or the
//! phase's fallback.
//!
//! Every call is bounded by the configured timeout. A timeout, transport
//! failure, empty reply or unparseable reply is logged at `warn` and
//! replaced by the fallback; nothing here returns an error.

use std::time::Duration;

use hamlet_types::{AgentProfile, PlannedAction};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::fallback;
use crate::parse::{self, ActionDecision, ConcernJudgement, PlanningDecision, ReflectionDecision};
use crate::prompt::PromptEngine;
use crate::request::{Oracle, OracleRequest, OracleTask};

/// Per-call limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OracleSettings {
    /// Deadline for one call.
    pub timeout: Duration,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self::from(&OracleConfig::default())
    }
}

impl From<&OracleConfig> for OracleSettings {
    fn from(config: &OracleConfig) -> Self {
        Self {
            timeout: config.timeout(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Wraps an [`Oracle`] with prompts, timeouts, parsing and fallbacks.
pub struct OracleAdapter<O> {
    oracle: O,
    prompts: PromptEngine,
    settings: OracleSettings,
}

impl<O: Oracle> OracleAdapter<O> {
    /// Create an adapter.
    pub const fn new(oracle: O, prompts: PromptEngine, settings: OracleSettings) -> Self {
        Self {
            oracle,
            prompts,
            settings,
        }
    }

    /// The wrapped oracle.
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Pick the next agent to act among `candidates` (`(id, name)` pairs in
    /// registration order). Falls back to the first candidate; `None` only
    /// when there are no candidates.
    pub async fn select_agent(&self, context: &Value, candidates: &[(&str, &str)]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        let result = self
            .decide(OracleTask::SelectAgent, context, |raw| {
                parse::parse_selection(raw, candidates)
            })
            .await;
        Some(recover(OracleTask::SelectAgent, result, || 0))
    }

    /// Ask whether a new plan is needed. Falls back to a no-op.
    pub async fn should_plan(&self, context: &Value) -> PlanningDecision {
        let result = self
            .decide(OracleTask::ShouldPlan, context, parse::parse_planning)
            .await;
        match result {
            Ok(decision) => decision,
            Err(err) => {
                warn!(task = %OracleTask::ShouldPlan, error = %err, "oracle fallback: no new plan");
                PlanningDecision {
                    should_plan: false,
                    reason: format!("oracle unavailable: {err}"),
                }
            }
        }
    }

    /// Ask for a plan. Falls back to [`fallback::plan_for`] the profile.
    pub async fn plan(&self, context: &Value, profile: &AgentProfile) -> Vec<PlannedAction> {
        let result = self
            .decide(OracleTask::Plan, context, parse::parse_plan)
            .await;
        recover(OracleTask::Plan, result, || fallback::plan_for(profile))
    }

    /// Ask what to do now. `None` means the oracle failed and the caller
    /// should fall back to its plan.
    pub async fn decide_action(&self, context: &Value) -> Option<ActionDecision> {
        let result = self
            .decide(OracleTask::DecideAction, context, parse::parse_action)
            .await;
        recover(OracleTask::DecideAction, result.map(Some), || None)
    }

    /// Ask for a conversation message. Falls back to `fallback_text`.
    pub async fn dialogue(&self, context: &Value, fallback_text: &str) -> String {
        let result = self
            .decide(OracleTask::Dialogue, context, parse::clean_text)
            .await;
        recover(OracleTask::Dialogue, result, || fallback_text.to_owned())
    }

    /// Ask what was learned about `topic`. Falls back to
    /// [`fallback::learning_note`].
    pub async fn learning_note(&self, context: &Value, topic: &str) -> String {
        let result = self
            .decide(OracleTask::Learning, context, parse::clean_text)
            .await;
        recover(OracleTask::Learning, result, || fallback::learning_note(topic))
    }

    /// Ask whether a childcare moment is worrying. Falls back to no concern.
    pub async fn concern(&self, context: &Value) -> ConcernJudgement {
        let result = self
            .decide(OracleTask::Concern, context, parse::parse_concern)
            .await;
        recover(OracleTask::Concern, result, ConcernJudgement::none)
    }

    /// Ask whether to reflect. Falls back to not reflecting.
    pub async fn should_reflect(&self, context: &Value) -> ReflectionDecision {
        let result = self
            .decide(OracleTask::ShouldReflect, context, parse::parse_reflection)
            .await;
        recover(OracleTask::ShouldReflect, result, || ReflectionDecision {
            should_reflect: false,
            reason: "oracle unavailable".to_owned(),
            importance: 5,
            emotional_state: None,
        })
    }

    /// Ask for a reflection. Falls back to [`fallback::REFLECTION`].
    pub async fn reflection(&self, context: &Value) -> String {
        let result = self
            .decide(OracleTask::Reflection, context, parse::clean_text)
            .await;
        recover(OracleTask::Reflection, result, || {
            fallback::REFLECTION.to_owned()
        })
    }

    /// Ask for a summary of a day made of `memories` memories.
    pub async fn experience_summary(&self, context: &Value, day: u64, memories: usize) -> String {
        let result = self
            .decide(OracleTask::ExperienceSummary, context, parse::clean_text)
            .await;
        recover(OracleTask::ExperienceSummary, result, || {
            fallback::experience_summary(day, memories)
        })
    }

    /// Ask for distilled wisdom. Falls back to [`fallback::WISDOM`].
    pub async fn wisdom(&self, context: &Value) -> String {
        let result = self
            .decide(OracleTask::Wisdom, context, parse::clean_text)
            .await;
        recover(OracleTask::Wisdom, result, || fallback::WISDOM.to_owned())
    }

    /// Ask for an optional community event. Failure means no event.
    pub async fn global_event(&self, context: &Value) -> Option<String> {
        let result = self
            .decide(OracleTask::GlobalEvent, context, parse::parse_event)
            .await;
        recover(OracleTask::GlobalEvent, result, || None)
    }

    /// Render, call under the deadline, then parse.
    async fn decide<T>(
        &self,
        task: OracleTask,
        context: &Value,
        parse: impl FnOnce(&str) -> Result<T, OracleError> + Send,
    ) -> Result<T, OracleError> {
        let raw = self.ask(task, context).await?;
        parse(&raw)
    }

    async fn ask(&self, task: OracleTask, context: &Value) -> Result<String, OracleError> {
        let prompt = self.prompts.render(task, context)?;
        let request = OracleRequest {
            task,
            prompt,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        debug!(task = %task, oracle = self.oracle.name(), "consulting oracle");
        match tokio::time::timeout(self.settings.timeout, self.oracle.complete(&request)).await {
            Ok(Ok(text)) if text.trim().is_empty() => Err(OracleError::EmptyResponse),
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout(self.settings.timeout.as_millis())),
        }
    }
}

/// Unwrap an oracle result or log and substitute the fallback.
fn recover<T>(task: OracleTask, result: Result<T, OracleError>, fallback: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|err| {
        warn!(task = %task, error = %err, "oracle fallback");
        fallback()
    })
}
