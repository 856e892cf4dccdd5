//! Integration tests for the cycle and the scheduler.
//!
//! Every test runs against a private in-memory `SQLite` store and a
//! scripted or always-failing oracle, so no network or external service is
//! needed.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::panic,
    clippy::large_futures
)]

use std::collections::BTreeSet;
use std::time::Duration;

use hamlet_core::clock::{ClockMode, SimClock};
use hamlet_core::cycle::{CycleEnv, CyclePhase, run_cycle};
use hamlet_core::decision::{Dice, SelectionPolicy};
use hamlet_core::{
    HamletConfig, NoOpCallback, OperatorState, RunLimits, Simulation, SimulationEndReason,
    SimulationState, TickCallback, TickStep, TickSummary, run_ticks,
};
use hamlet_oracle::{
    Oracle, OracleAdapter, OracleError, OracleSettings, OracleTask, PromptEngine, ScriptedOracle,
    StubOracle,
};
use hamlet_store::{ConversationQuery, Database, MemoryQuery};
use hamlet_types::{ActionKind, AgentId, AgentProfile, ConversationKind, MemoryKind};

// =============================================================================
// Helpers
// =============================================================================

const CHATTY: &[(OracleTask, &str)] = &[
    (
        OracleTask::DecideAction,
        r#"{"should_act": true, "action_type": "conversation", "specific_intention": "say hello to everyone", "motivation": "feeling friendly", "target": null}"#,
    ),
    (OracleTask::Dialogue, "Good morning, neighbours!"),
    (
        OracleTask::Plan,
        r#"{"actions": [{"description": "Chat with the group", "kind": "conversation", "priority": 5}]}"#,
    ),
];

fn scripted(replies: &'static [(OracleTask, &'static str)]) -> ScriptedOracle {
    ScriptedOracle::new(move |request| {
        replies
            .iter()
            .find(|(task, _)| *task == request.task)
            .map(|(_, reply)| (*reply).to_owned())
            .ok_or_else(|| OracleError::Unavailable("unscripted".to_owned()))
    })
}

fn adapter<O: Oracle>(oracle: O) -> OracleAdapter<O> {
    OracleAdapter::new(
        oracle,
        PromptEngine::builtin().expect("built-in templates"),
        OracleSettings {
            timeout: Duration::from_secs(2),
            ..OracleSettings::default()
        },
    )
}

fn mother() -> AgentProfile {
    serde_json::from_value(serde_json::json!({
        "id": "li_mei",
        "name": "Li Mei",
        "age": 29,
        "role": "young mother",
        "children": [{"name": "Xiaoyu", "age": 3}],
        "concerns": ["child fever"],
        "learning_interests": ["healthy recipes"],
        "active_hours": (0..24).collect::<Vec<u8>>(),
        "help_seeking_threshold": 5,
    }))
    .expect("valid profile")
}

fn grandmother() -> AgentProfile {
    serde_json::from_value(serde_json::json!({
        "id": "wang_fang",
        "name": "Wang Fang",
        "age": 63,
        "role": "grandmother",
        "personality": {
            "interests": ["gardening"],
            "digital_habits": {"preferred_platforms": ["Douyin"], "video_preferences": ["cooking"]},
        },
        "active_hours": (0..24).collect::<Vec<u8>>(),
    }))
    .expect("valid profile")
}

fn config() -> HamletConfig {
    let mut config = HamletConfig::default();
    config.simulation.global_event_interval = 0;
    config.policy.plan_probability = 0.0;
    config.policy.reflect_probability = 0.0;
    config
}

async fn store(roster: &[AgentProfile]) -> Database {
    let db = Database::in_memory().await.expect("open in-memory store");
    db.run_migrations().await.expect("run migrations");
    for profile in roster {
        db.agents().register(profile).await.expect("register");
    }
    db
}

async fn simulation<O: Oracle>(
    roster: &[AgentProfile],
    oracle: O,
    config: HamletConfig,
) -> Simulation<O> {
    let db = store(roster).await;
    Simulation::new(db, adapter(oracle), config)
        .await
        .expect("build simulation")
}

fn limits(max_ticks: u64, max_conversations: Option<u64>) -> RunLimits {
    RunLimits {
        max_ticks,
        tick_interval: Duration::ZERO,
        max_conversations,
    }
}

fn fresh_state(roster: &[AgentProfile], config: &HamletConfig) -> SimulationState {
    let clock = SimClock::new(&config.clock);
    SimulationState::new(roster, &config.runtime, clock.reading(0), 10, None)
}

struct Counter(u64);

impl TickCallback for Counter {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
        self.0 += 1;
    }
}

// =============================================================================
// Scheduler
// =============================================================================

#[tokio::test]
async fn two_agents_stop_at_three_conversations() {
    let roster = [mother(), grandmother()];
    let mut sim = simulation(&roster, scripted(CHATTY), config()).await;
    let operator = OperatorState::new(0);

    let result = run_ticks(&mut sim, limits(5, Some(3)), &operator, &mut NoOpCallback)
        .await
        .unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::ConversationLimitReached);
    assert!(result.total_ticks <= 5);
    assert_eq!(result.state.conversation_count, 3);

    let rows = sim
        .database()
        .conversations()
        .query(&ConversationQuery::recent(100))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    let ids: BTreeSet<AgentId> = roster.iter().map(|p| p.id.clone()).collect();
    assert!(rows.iter().all(|c| ids.contains(&c.from_agent)));
}

#[tokio::test]
async fn conversation_cap_is_never_exceeded() {
    for cap in 1..=5 {
        let roster = [mother(), grandmother()];
        let mut sim = simulation(&roster, scripted(CHATTY), config()).await;
        let result = run_ticks(&mut sim, limits(10, Some(cap)), &OperatorState::new(0), &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.state.conversation_count, cap);
        assert_eq!(sim.database().conversations().count().await.unwrap(), cap);
    }
}

#[tokio::test]
async fn counter_matches_stored_conversations() {
    let roster = [mother(), grandmother()];
    let mut sim = simulation(&roster, scripted(CHATTY), config()).await;
    let result = run_ticks(&mut sim, limits(4, None), &OperatorState::new(0), &mut NoOpCallback)
        .await
        .unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
    assert_eq!(result.total_ticks, 4);
    let stored = sim.database().conversations().count().await.unwrap();
    assert_eq!(result.state.conversation_count, stored);
    assert_eq!(stored, 8);
}

#[tokio::test]
async fn failing_oracle_tick_completes_and_keeps_agents() {
    let roster = [mother(), grandmother()];
    let mut sim = simulation(&roster, StubOracle::default(), config()).await;
    let before = sim.database().agents().list().await.unwrap();

    let step = sim.step().await.unwrap();
    let TickStep::Ran(summary) = step else {
        panic!("expected a tick to run, got {step:?}");
    };
    assert_eq!(summary.acted.len(), 2);
    assert!(summary.failed.is_empty());
    assert_eq!(summary.conversations, 0);

    let after = sim.database().agents().list().await.unwrap();
    assert_eq!(before, after);

    // Fallback plans drive the actions: childcare first for the parent,
    // digital activity for the grandmother.
    let state = sim.state();
    let mei = &state.agent_states[&AgentId::new("li_mei")];
    let fang = &state.agent_states[&AgentId::new("wang_fang")];
    assert_eq!(mei.last_action, Some(ActionKind::Childcare));
    assert_eq!(fang.last_action, Some(ActionKind::DigitalActivity));
    assert_eq!(mei.cycles_completed, 1);
    assert_eq!(mei.energy_level, 6);
}

#[tokio::test]
async fn tick_cap_ends_the_run_and_calls_back_each_tick() {
    let roster = [grandmother()];
    let mut sim = simulation(&roster, StubOracle::default(), config()).await;
    let mut counter = Counter(0);

    let result = run_ticks(&mut sim, limits(3, None), &OperatorState::new(0), &mut counter)
        .await
        .unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
    assert_eq!(result.total_ticks, 3);
    assert_eq!(counter.0, 3);
    assert_eq!(result.final_summary.unwrap().tick, 2);
    assert_eq!(result.state.tick_count, 3);
}

#[tokio::test]
async fn operator_stop_is_honored_before_the_next_tick() {
    let roster = [grandmother()];
    let mut sim = simulation(&roster, StubOracle::default(), config()).await;
    let operator = OperatorState::new(0);
    operator.request_stop();

    let result = run_ticks(&mut sim, limits(10, None), &operator, &mut NoOpCallback)
        .await
        .unwrap();

    assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
    assert_eq!(result.total_ticks, 0);
    assert!(result.final_summary.is_none());
}

#[tokio::test]
async fn oracle_selection_runs_only_the_chosen_agent() {
    const PICK: &[(OracleTask, &str)] = &[
        (OracleTask::SelectAgent, r#"{"agent": "wang_fang", "reason": "rested"}"#),
        (OracleTask::DecideAction, r#"{"should_act": false}"#),
    ];
    let mut config = config();
    config.policy.selection = SelectionPolicy::Oracle;
    let roster = [mother(), grandmother()];
    let mut sim = simulation(&roster, scripted(PICK), config).await;

    let TickStep::Ran(summary) = sim.step().await.unwrap() else {
        panic!("expected a tick to run");
    };
    assert_eq!(summary.acted, [AgentId::new("wang_fang")]);
    let fang = &sim.state().agent_states[&AgentId::new("wang_fang")];
    assert_eq!(fang.last_action, Some(ActionKind::Rest));
    assert_eq!(fang.energy_level, 9);
}

#[tokio::test]
async fn failed_selection_falls_back_to_first_registered() {
    let mut config = config();
    config.policy.selection = SelectionPolicy::Oracle;
    let roster = [grandmother(), mother()];
    let mut sim = simulation(&roster, StubOracle::default(), config).await;

    let TickStep::Ran(summary) = sim.step().await.unwrap() else {
        panic!("expected a tick to run");
    };
    assert_eq!(summary.acted, [AgentId::new("wang_fang")]);
}

#[tokio::test]
async fn global_event_reaches_next_observation() {
    const EVENT: &[(OracleTask, &str)] = &[(
        OracleTask::GlobalEvent,
        r#"{"event": "The kindergarten is closed for a flu outbreak"}"#,
    )];
    let mut config = config();
    config.simulation.global_event_interval = 1;
    let roster = [grandmother()];
    let mut sim = simulation(&roster, scripted(EVENT), config).await;

    let TickStep::Ran(first) = sim.step().await.unwrap() else {
        panic!("expected a tick to run");
    };
    assert!(first.global_event.is_some());

    sim.step().await.unwrap();
    let fang = &sim.state().agent_states[&AgentId::new("wang_fang")];
    let observed = fang.current_observation.as_ref().unwrap();
    assert_eq!(
        observed.global_event.as_deref(),
        Some("The kindergarten is closed for a flu outbreak")
    );
}

#[tokio::test]
async fn day_rollover_writes_experience_summaries() {
    let mut config = config();
    config.clock.mode = ClockMode::Simulated;
    config.clock.hours_per_tick = 24;
    let roster = [mother(), grandmother()];
    let mut sim = simulation(&roster, StubOracle::default(), config).await;

    sim.step().await.unwrap();
    assert_eq!(sim.state().day, 1);
    sim.step().await.unwrap();
    assert_eq!(sim.state().day, 2);

    for profile in &roster {
        let summaries = sim
            .database()
            .memories()
            .query(
                &profile.id,
                MemoryQuery::recent(10).of_kind(MemoryKind::ExperienceSummary),
            )
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1, "summary for {}", profile.id);
        assert_eq!(summaries[0].importance, 8);
    }
}

#[tokio::test]
async fn agents_without_a_loaded_profile_never_act() {
    let roster = [mother(), grandmother()];
    let db = store(&roster).await;
    let only = [roster[1].id.clone()];
    let mut sim = Simulation::with_agents(db, adapter(scripted(CHATTY)), config(), &only)
        .await
        .unwrap();
    assert_eq!(sim.roster().len(), 1);
    assert!(!sim.state().agent_states.contains_key(&roster[0].id));

    let result = run_ticks(&mut sim, limits(3, None), &OperatorState::new(0), &mut NoOpCallback)
        .await
        .unwrap();
    assert_eq!(result.state.conversation_count, 3);
    let rows = sim
        .database()
        .conversations()
        .query(&ConversationQuery::recent(10))
        .await
        .unwrap();
    assert!(rows.iter().all(|c| c.from_agent == roster[1].id));
    assert_eq!(sim.database().agents().count().await.unwrap(), 2);
}

#[tokio::test]
async fn same_seed_same_history() {
    async fn history(seed: u64) -> Vec<(MemoryKind, String)> {
        let mut config = config();
        config.simulation.seed = seed;
        config.policy.plan_probability = 0.5;
        config.policy.reflect_probability = 0.5;
        let roster = [grandmother()];
        let mut sim = simulation(&roster, StubOracle::default(), config).await;
        run_ticks(&mut sim, limits(6, None), &OperatorState::new(0), &mut NoOpCallback)
            .await
            .unwrap();
        let mut memories = sim
            .database()
            .memories()
            .all_for(&AgentId::new("wang_fang"))
            .await
            .unwrap();
        memories.sort_by_key(|m| m.seq);
        memories.into_iter().map(|m| (m.kind, m.content)).collect()
    }

    assert_eq!(history(11).await, history(11).await);
}

// =============================================================================
// Cycle
// =============================================================================

#[tokio::test]
async fn childcare_without_children_is_a_no_op() {
    const CHILDCARE: &[(OracleTask, &str)] = &[(
        OracleTask::DecideAction,
        r#"{"should_act": true, "action_type": "childcare", "specific_intention": "check on the kids"}"#,
    )];
    let roster = [grandmother()];
    let config = config();
    let db = store(&roster).await;
    let oracle = adapter(scripted(CHILDCARE));
    let mut dice = Dice::new(1);
    let mut state = fresh_state(&roster, &config);
    let mut env = CycleEnv {
        db: &db,
        oracle: &oracle,
        config: &config,
        roster: &roster,
        dice: &mut dice,
    };

    let outcome = run_cycle(&mut env, &mut state, &roster[0]).await.unwrap();

    assert_eq!(
        outcome.phases,
        [
            CyclePhase::Observing,
            CyclePhase::Planning,
            CyclePhase::Executing,
            CyclePhase::Reflecting,
            CyclePhase::Done,
        ]
    );
    assert!(outcome.completed());
    assert!(outcome.action.is_none());
    assert!(outcome.conversation.is_none());

    let id = &roster[0].id;
    for kind in [MemoryKind::Action, MemoryKind::Concern, MemoryKind::PlanUpdate] {
        let rows = db
            .memories()
            .query(id, MemoryQuery::recent(10).of_kind(kind))
            .await
            .unwrap();
        assert!(rows.is_empty(), "unexpected {kind} memory");
    }
    assert_eq!(db.conversations().count().await.unwrap(), 0);
    let runtime = &state.agent_states[id];
    assert_eq!(runtime.energy_level, 7);
    assert_eq!(runtime.cycles_completed, 1);
}

#[tokio::test]
async fn concern_triggers_a_help_request() {
    const WORRIED: &[(OracleTask, &str)] = &[
        (
            OracleTask::DecideAction,
            r#"{"should_act": true, "action_type": "childcare", "specific_intention": "take Xiaoyu's temperature"}"#,
        ),
        (OracleTask::Concern, r#"{"concerned": true, "concern": "a high fever"}"#),
        (OracleTask::Dialogue, "Xiaoyu has a fever, what helped your little ones?"),
    ];
    let roster = [mother(), grandmother()];
    let config = config();
    let db = store(&roster).await;
    let oracle = adapter(scripted(WORRIED));
    let mut dice = Dice::new(1);
    let mut state = fresh_state(&roster, &config);
    let mut env = CycleEnv {
        db: &db,
        oracle: &oracle,
        config: &config,
        roster: &roster,
        dice: &mut dice,
    };

    let outcome = run_cycle(&mut env, &mut state, &roster[0]).await.unwrap();

    let conversation = outcome.conversation.expect("help request");
    assert_eq!(conversation.kind, ConversationKind::HelpRequest);
    assert!(conversation.is_broadcast());
    assert_eq!(state.conversation_count, 1);

    let mei = &roster[0].id;
    let concerns = db
        .memories()
        .query(mei, MemoryQuery::recent(10).of_kind(MemoryKind::Concern))
        .await
        .unwrap();
    assert_eq!(concerns.len(), 1);
    assert_eq!(concerns[0].importance, 8);
    assert!(concerns[0].content.contains("a high fever"));
    assert_eq!(state.agent_states[mei].emotional_state, "worried");

    // The grandmother sees the broadcast in her window.
    let fang = &state.agent_states[&AgentId::new("wang_fang")];
    assert_eq!(fang.recent_conversations.len(), 1);
}

#[tokio::test]
async fn every_concern_asks_for_help_whatever_the_threshold() {
    const WORRIED: &[(OracleTask, &str)] = &[
        (
            OracleTask::DecideAction,
            r#"{"should_act": true, "action_type": "childcare", "specific_intention": "check Xiaoyu's rash"}"#,
        ),
        (OracleTask::Concern, r#"{"concerned": true, "concern": "a spreading rash"}"#),
    ];
    let mut reluctant = mother();
    reluctant.help_seeking_threshold = 10;
    let roster = [reluctant, grandmother()];
    let config = config();
    let db = store(&roster).await;
    let oracle = adapter(scripted(WORRIED));
    let mut dice = Dice::new(1);
    let mut state = fresh_state(&roster, &config);
    let mut env = CycleEnv {
        db: &db,
        oracle: &oracle,
        config: &config,
        roster: &roster,
        dice: &mut dice,
    };

    let outcome = run_cycle(&mut env, &mut state, &roster[0]).await.unwrap();

    let conversation = outcome.conversation.expect("help request");
    assert_eq!(conversation.kind, ConversationKind::HelpRequest);
    assert!(conversation.is_broadcast());
    assert!(conversation.message.contains("a spreading rash"));
    assert_eq!(state.conversation_count, 1);
    let concerns = db
        .memories()
        .query(&roster[0].id, MemoryQuery::recent(10).of_kind(MemoryKind::Concern))
        .await
        .unwrap();
    assert_eq!(concerns.len(), 1);
}

#[tokio::test]
async fn childless_agent_skips_planned_childcare() {
    const PLANNER: &[(OracleTask, &str)] = &[(
        OracleTask::Plan,
        r#"{"actions": [{"description": "Look after the grandchildren", "kind": "childcare", "priority": 9}, {"description": "Chat with the group", "kind": "conversation", "priority": 5}]}"#,
    )];
    let roster = [grandmother()];
    let config = config();
    let db = store(&roster).await;
    let oracle = adapter(scripted(PLANNER));
    let mut dice = Dice::new(1);
    let mut state = fresh_state(&roster, &config);

    let mut actions = Vec::new();
    for _ in 0..5 {
        let mut env = CycleEnv {
            db: &db,
            oracle: &oracle,
            config: &config,
            roster: &roster,
            dice: &mut dice,
        };
        let outcome = run_cycle(&mut env, &mut state, &roster[0]).await.unwrap();
        actions.push(outcome.action);
    }

    assert_eq!(actions, vec![Some(ActionKind::Conversation); 5]);
    assert_eq!(state.conversation_count, 5);
    let plan = db.plans().current(&roster[0].id).await.unwrap().unwrap();
    assert!(plan.actions.iter().all(|a| a.kind != ActionKind::Childcare));
}

#[tokio::test]
async fn named_target_gets_a_private_message() {
    const PRIVATE: &[(OracleTask, &str)] = &[
        (
            OracleTask::DecideAction,
            r#"{"should_act": true, "action_type": "conversation", "specific_intention": "ask about fever remedies", "target": "Wang Fang"}"#,
        ),
        (OracleTask::Dialogue, "Auntie Wang, what do you do for a fever?"),
    ];
    let roster = [mother(), grandmother()];
    let config = config();
    let db = store(&roster).await;
    let oracle = adapter(scripted(PRIVATE));
    let mut dice = Dice::new(1);
    let mut state = fresh_state(&roster, &config);
    let mut env = CycleEnv {
        db: &db,
        oracle: &oracle,
        config: &config,
        roster: &roster,
        dice: &mut dice,
    };

    let outcome = run_cycle(&mut env, &mut state, &roster[0]).await.unwrap();
    let conversation = outcome.conversation.unwrap();
    assert_eq!(conversation.kind, ConversationKind::PrivateChat);
    assert_eq!(conversation.to_agent, Some(AgentId::new("wang_fang")));

    let echoes = db
        .memories()
        .query(&roster[0].id, MemoryQuery::recent(10).of_kind(MemoryKind::ConversationEcho))
        .await
        .unwrap();
    assert_eq!(echoes.len(), 1);
    assert_eq!(echoes[0].importance, 4);

    // The recipient observes the direct message as important health talk.
    let fang = roster[1].clone();
    let mut env = CycleEnv {
        db: &db,
        oracle: &oracle,
        config: &config,
        roster: &roster,
        dice: &mut dice,
    };
    run_cycle(&mut env, &mut state, &fang).await.unwrap();
    let observed = state.agent_states[&fang.id].current_observation.clone().unwrap();
    assert_eq!(observed.social.len(), 1);
    assert!(observed.social[0].direct);
    assert_eq!(observed.social[0].importance, 8);
    let noticed = db
        .memories()
        .query(&fang.id, MemoryQuery::recent(10).of_kind(MemoryKind::Observation))
        .await
        .unwrap();
    assert_eq!(noticed.len(), 1);
    assert_eq!(noticed[0].importance, 8);
}

#[tokio::test]
async fn fallback_plan_step_is_completed_after_acting() {
    let roster = [grandmother()];
    let config = config();
    let db = store(&roster).await;
    let oracle = adapter(StubOracle::default());
    let mut dice = Dice::new(1);
    let mut state = fresh_state(&roster, &config);
    let mut env = CycleEnv {
        db: &db,
        oracle: &oracle,
        config: &config,
        roster: &roster,
        dice: &mut dice,
    };

    let outcome = run_cycle(&mut env, &mut state, &roster[0]).await.unwrap();
    assert!(outcome.new_plan.is_some());
    assert_eq!(outcome.action, Some(ActionKind::DigitalActivity));

    let id = &roster[0].id;
    let plan = db.plans().current(id).await.unwrap().unwrap();
    let digital = plan
        .actions
        .iter()
        .find(|a| a.kind == ActionKind::DigitalActivity)
        .unwrap();
    assert_eq!(digital.status, hamlet_types::PlanStatus::Completed);
    let updates = db
        .memories()
        .query(id, MemoryQuery::recent(10).of_kind(MemoryKind::PlanUpdate))
        .await
        .unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].importance, 3);
}

#[tokio::test]
async fn oracle_reflection_applies_emotion_and_clamps_importance() {
    const REFLECTIVE: &[(OracleTask, &str)] = &[
        (OracleTask::DecideAction, r#"{"should_act": false}"#),
        (
            OracleTask::ShouldReflect,
            r#"{"should_reflect": true, "reason": "a long day", "importance": 12, "emotional_state": "Content"}"#,
        ),
        (OracleTask::Reflection, "Today was calm and I feel rested."),
    ];
    let mut config = config();
    config.policy.reflection = hamlet_core::decision::DecisionMode::Oracle;
    let roster = [grandmother()];
    let db = store(&roster).await;
    let oracle = adapter(scripted(REFLECTIVE));
    let mut dice = Dice::new(1);
    let mut state = fresh_state(&roster, &config);
    let mut env = CycleEnv {
        db: &db,
        oracle: &oracle,
        config: &config,
        roster: &roster,
        dice: &mut dice,
    };

    run_cycle(&mut env, &mut state, &roster[0]).await.unwrap();

    let id = &roster[0].id;
    let reflections = db
        .memories()
        .query(id, MemoryQuery::recent(10).of_kind(MemoryKind::Reflection))
        .await
        .unwrap();
    assert_eq!(reflections.len(), 1);
    assert_eq!(reflections[0].importance, 9);
    assert_eq!(reflections[0].content, "Today was calm and I feel rested.");
    assert_eq!(state.agent_states[id].emotional_state, "content");
}
