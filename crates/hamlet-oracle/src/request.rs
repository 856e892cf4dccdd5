//! The oracle contract: a prompt in, text or failure out.
//!
//! [`Oracle`] uses a return-position `impl Future` instead of `async_trait`,
//! so it is not object-safe; callers are generic over the oracle type and
//! the engine picks a concrete backend with [`LlmBackend`](crate::llm::LlmBackend)
//! enum dispatch.

use std::future::Future;

use crate::error::OracleError;
use crate::prompt::RenderedPrompt;

/// Which decision or piece of content a request is for.
///
/// Carried on every request for logging and so test doubles can script
/// replies per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OracleTask {
    /// Pick the next agent to act.
    SelectAgent,
    /// Decide whether a new plan is needed.
    ShouldPlan,
    /// Write a plan.
    Plan,
    /// Choose the action to execute.
    DecideAction,
    /// Write a conversation message.
    Dialogue,
    /// Write a note on something learned.
    Learning,
    /// Judge whether a childcare moment is worrying.
    Concern,
    /// Decide whether to reflect.
    ShouldReflect,
    /// Write a reflection.
    Reflection,
    /// Write an end-of-day experience summary.
    ExperienceSummary,
    /// Distill wisdom from many experiences.
    Wisdom,
    /// Propose an optional community event.
    GlobalEvent,
}

impl OracleTask {
    /// Template name and log label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectAgent => "select_agent",
            Self::ShouldPlan => "should_plan",
            Self::Plan => "plan",
            Self::DecideAction => "decide_action",
            Self::Dialogue => "dialogue",
            Self::Learning => "learning",
            Self::Concern => "concern",
            Self::ShouldReflect => "should_reflect",
            Self::Reflection => "reflection",
            Self::ExperienceSummary => "experience_summary",
            Self::Wisdom => "wisdom",
            Self::GlobalEvent => "global_event",
        }
    }

    /// Whether the reply is expected to be a JSON object.
    pub const fn expects_json(self) -> bool {
        matches!(
            self,
            Self::SelectAgent
                | Self::ShouldPlan
                | Self::Plan
                | Self::DecideAction
                | Self::Concern
                | Self::ShouldReflect
                | Self::GlobalEvent
        )
    }

    /// Whether the system message narrates the community rather than
    /// speaking as one agent.
    pub const fn is_narrator(self) -> bool {
        matches!(self, Self::SelectAgent | Self::GlobalEvent)
    }
}

impl core::fmt::Display for OracleTask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the oracle.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// What the request is for.
    pub task: OracleTask,
    /// System and user messages.
    pub prompt: RenderedPrompt,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A generative text service.
pub trait Oracle: Send + Sync {
    /// Send a request and return the raw response text.
    fn complete(
        &self,
        request: &OracleRequest,
    ) -> impl Future<Output = Result<String, OracleError>> + Send;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
