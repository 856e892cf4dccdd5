//! Literal responses used when the oracle fails.

use hamlet_types::{ActionKind, AgentProfile, PlanStatus, PlannedAction};

/// Group-chat message when no dialogue could be generated.
pub const GREETING: &str = "Hi everyone, how is your day going?";

/// Reflection text when none could be generated.
pub const REFLECTION: &str = "Thought back over recent events for a while.";

/// Wisdom text when none could be generated.
pub const WISDOM: &str = "Small routines kept every day matter more than big plans.";

/// Help request for a concern.
pub fn help_request(concern: &str) -> String {
    format!("Could anyone give me some advice about {concern}?")
}

/// Learning note for a topic.
pub fn learning_note(topic: &str) -> String {
    format!("Picked up some practical tips about {topic}")
}

/// End-of-day summary built from the day's memory count.
pub fn experience_summary(day: u64, memories: usize) -> String {
    format!("Day {day} went by with {memories} things worth remembering.")
}

/// A plan derived from the profile alone.
///
/// Parents look after their first child first; everyone learns about their
/// first interest and checks in with the group.
pub fn plan_for(profile: &AgentProfile) -> Vec<PlannedAction> {
    let step = |description: String, kind: ActionKind, priority: u8| PlannedAction {
        description,
        kind,
        priority,
        status: PlanStatus::Pending,
        planned_time: None,
    };

    let interest = profile
        .learning_interests
        .first()
        .or_else(|| profile.personality.interests.first())
        .map_or("daily life", String::as_str);
    let topic = profile.concerns.first().map_or("the day", String::as_str);

    let mut actions = Vec::with_capacity(3);
    if let Some(child) = profile.children.first() {
        actions.push(step(
            format!("Spend time with {} and see how they are doing", child.name),
            ActionKind::Childcare,
            8,
        ));
    }
    actions.push(step(
        format!("Watch a short video about {interest}"),
        ActionKind::DigitalActivity,
        6,
    ));
    actions.push(step(
        format!("Chat with the group about {topic}"),
        ActionKind::Conversation,
        5,
    ));
    actions
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn profile(children: bool) -> AgentProfile {
        let mut json = serde_json::json!({
            "id": "li_mei",
            "name": "Li Mei",
            "age": 34,
            "role": "accountant",
            "learning_interests": ["child nutrition"],
            "concerns": ["school choice"],
        });
        if children {
            json["children"] = serde_json::json!([{"name": "Xiaoyu", "age": 5}]);
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn parents_plan_childcare_first() {
        let plan = plan_for(&profile(true));
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].kind, ActionKind::Childcare);
        assert!(plan[0].description.contains("Xiaoyu"));
        assert!(plan[1].description.contains("child nutrition"));
        assert!(plan[2].description.contains("school choice"));
    }

    #[test]
    fn plan_without_children_has_no_childcare() {
        let plan = plan_for(&profile(false));
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|a| a.kind != ActionKind::Childcare));
        assert!(plan.iter().all(|a| (1..=10).contains(&a.priority)));
    }

    #[test]
    fn help_request_names_the_concern() {
        assert_eq!(
            help_request("a fever"),
            "Could anyone give me some advice about a fever?"
        );
    }
}
