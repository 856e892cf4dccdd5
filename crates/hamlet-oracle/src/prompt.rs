//! Prompt template loading and rendering via `minijinja`.
//!
//! The built-in templates are compiled into the binary. When a templates
//! directory is configured, any `<name>.j2` found there replaces the
//! built-in of the same name, so operators can tune prompts without
//! recompiling.

use std::path::Path;

use minijinja::{Environment, UndefinedBehavior};

use crate::error::OracleError;
use crate::request::OracleTask;

/// Built-in templates: (name, source).
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("system", include_str!("../templates/system.j2")),
    ("narrator", include_str!("../templates/narrator.j2")),
    ("context", include_str!("../templates/context.j2")),
    ("select_agent", include_str!("../templates/select_agent.j2")),
    ("should_plan", include_str!("../templates/should_plan.j2")),
    ("plan", include_str!("../templates/plan.j2")),
    ("decide_action", include_str!("../templates/decide_action.j2")),
    ("dialogue", include_str!("../templates/dialogue.j2")),
    ("learning", include_str!("../templates/learning.j2")),
    ("concern", include_str!("../templates/concern.j2")),
    ("should_reflect", include_str!("../templates/should_reflect.j2")),
    ("reflection", include_str!("../templates/reflection.j2")),
    (
        "experience_summary",
        include_str!("../templates/experience_summary.j2"),
    ),
    ("wisdom", include_str!("../templates/wisdom.j2")),
    ("global_event", include_str!("../templates/global_event.j2")),
];

/// Manages prompt templates.
pub struct PromptEngine {
    env: Environment<'static>,
}

/// A rendered prompt ready to send to an oracle backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System message: the agent's persona, or the narrator.
    pub system: String,
    /// User message: context and the question.
    pub user: String,
}

impl PromptEngine {
    /// Create an engine with the built-in templates only.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Template`] if a built-in fails to compile.
    pub fn builtin() -> Result<Self, OracleError> {
        Self::new(None)
    }

    /// Create an engine, layering `*.j2` overrides from `templates_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Template`] if the directory cannot be read or
    /// a template fails to compile.
    pub fn new(templates_dir: Option<&Path>) -> Result<Self, OracleError> {
        let mut env = Environment::new();
        // Contexts are sparse: a missing section renders as nothing.
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        for (name, source) in BUILTIN_TEMPLATES {
            let source = match templates_dir {
                Some(dir) => load_override(dir, name)?.unwrap_or_else(|| (*source).to_owned()),
                None => (*source).to_owned(),
            };
            env.add_template_owned(*name, source)
                .map_err(|e| OracleError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Render the prompt for `task` against `context`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Template`] on a render failure.
    pub fn render(
        &self,
        task: OracleTask,
        context: &serde_json::Value,
    ) -> Result<RenderedPrompt, OracleError> {
        let system_name = if task.is_narrator() { "narrator" } else { "system" };
        let system = self.render_one(system_name, context)?;
        let user = self.render_one(task.as_str(), context)?;
        Ok(RenderedPrompt {
            system: system.trim().to_owned(),
            user: user.trim().to_owned(),
        })
    }

    fn render_one(&self, name: &str, context: &serde_json::Value) -> Result<String, OracleError> {
        self.env
            .get_template(name)
            .map_err(|e| OracleError::Template(format!("missing {name} template: {e}")))?
            .render(context)
            .map_err(|e| OracleError::Template(format!("{name} render failed: {e}")))
    }
}

/// Read `<dir>/<name>.j2` if it exists.
fn load_override(dir: &Path, name: &str) -> Result<Option<String>, OracleError> {
    let path = dir.join(format!("{name}.j2"));
    if !path.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| OracleError::Template(format!("failed to read {}: {e}", path.display())))
}
