//! Prompt context assembly.
//!
//! Templates see one JSON object per call. [`agent_context`] builds the
//! shared part (who the agent is, how they feel, what time it is, what they
//! observed, what they plan); phases add their own keys with [`extend`].

use hamlet_agents::RuntimeState;
use hamlet_agents::memory::prompt_lines;
use hamlet_types::{AgentProfile, Observation, Plan, SocialObservation};
use serde_json::{Value, json};

use crate::state::SimulationState;

/// Shared context for a prompt about one agent.
pub fn agent_context(
    profile: &AgentProfile,
    runtime: &RuntimeState,
    observation: &Observation,
) -> Value {
    json!({
        "agent": agent_json(profile),
        "state": {
            "energy": runtime.energy_level,
            "emotion": runtime.emotional_state,
        },
        "time": {
            "tick": observation.tick,
            "day": observation.day,
            "hour": observation.hour,
            "description": observation.time_of_day.describe(),
        },
        "event": observation.global_event,
        "social": observation.social.iter().map(social_line).collect::<Vec<_>>(),
        "memories": prompt_lines(&observation.recent_memories),
        "plan": runtime.current_plan.as_ref().map(plan_json).unwrap_or_default(),
    })
}

/// Context for narrator prompts (agent selection, global events).
pub fn narrator_context(state: &SimulationState, social: &[String]) -> Value {
    json!({
        "time": {
            "tick": state.tick_count,
            "day": state.day,
            "hour": state.hour,
            "description": state.time_of_day.describe(),
        },
        "social": social,
    })
}

/// Context for the end-of-day prompts, over the given memory lines.
pub fn review_context(
    profile: &AgentProfile,
    runtime: &RuntimeState,
    day: u64,
    memories: Vec<String>,
) -> Value {
    json!({
        "agent": agent_json(profile),
        "state": {
            "energy": runtime.energy_level,
            "emotion": runtime.emotional_state,
        },
        "time": { "day": day },
        "memories": memories,
    })
}

/// Merge the keys of `extra` (an object) into `context`. Later keys win.
pub fn extend(mut context: Value, extra: Value) -> Value {
    if let (Value::Object(base), Value::Object(more)) = (&mut context, extra) {
        base.extend(more);
    }
    context
}

fn agent_json(profile: &AgentProfile) -> Value {
    json!({
        "name": profile.name,
        "age": profile.age,
        "role": profile.role,
        "traits": profile.personality.traits,
        "communication_style": profile.personality.communication_style,
        "children": profile
            .children
            .iter()
            .map(|c| json!({"name": c.name, "age": c.age}))
            .collect::<Vec<_>>(),
        "concerns": profile.concerns,
    })
}

fn plan_json(plan: &Plan) -> Vec<Value> {
    plan.actions
        .iter()
        .map(|a| {
            json!({
                "status": a.status.as_str(),
                "description": a.description,
                "priority": a.priority,
            })
        })
        .collect()
}

fn social_line(item: &SocialObservation) -> String {
    if item.direct {
        format!("{} (to you): {}", item.from_name, item.message)
    } else {
        format!("{}: {}", item.from_name, item.message)
    }
}
