//! Integration tests for the `hamlet-store` entity store.
//!
//! Every test runs against a private in-memory `SQLite` database, so no
//! external service is needed.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeSet;

use hamlet_store::{
    ConversationQuery, Database, MemoryQuery, RetentionPolicy, StoreConfig, StoreError,
};
use hamlet_types::{
    ActionKind, AgentId, AgentProfile, ConversationKind, MemoryKind, NewConversation, NewMemory,
    Plan, PlanStatus, PlannedAction,
};

// =============================================================================
// Helpers
// =============================================================================

async fn setup() -> Database {
    let db = Database::in_memory().await.expect("open in-memory store");
    db.run_migrations().await.expect("run migrations");
    db
}

fn profile(id: &str, name: &str) -> AgentProfile {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "age": 31,
        "role": "young mother",
        "children": [{"name": "Tiantian", "age": 2}],
        "concerns": ["child fever"],
    }))
    .expect("valid profile json")
}

async fn setup_with_agents() -> (Database, AgentId, AgentId) {
    let db = setup().await;
    db.agents().register(&profile("a", "Alice")).await.unwrap();
    db.agents().register(&profile("b", "Bao")).await.unwrap();
    (db, AgentId::new("a"), AgentId::new("b"))
}

fn step(description: &str, priority: u8) -> PlannedAction {
    PlannedAction {
        description: description.to_owned(),
        kind: ActionKind::classify(description),
        priority,
        status: PlanStatus::Pending,
        planned_time: None,
    }
}

fn broadcast(from: &AgentId, message: &str) -> NewConversation {
    NewConversation {
        from_agent: from.clone(),
        to_agent: None,
        message: message.to_owned(),
        kind: ConversationKind::GroupChat,
        metadata: serde_json::Value::Null,
    }
}

// =============================================================================
// Agents
// =============================================================================

#[tokio::test]
async fn register_is_idempotent_upsert() {
    let db = setup().await;
    db.agents().register(&profile("a", "Alice")).await.unwrap();
    db.agents().register(&profile("a", "Alice Wang")).await.unwrap();

    assert_eq!(db.agents().count().await.unwrap(), 1);
    let stored = db.agents().get(&AgentId::new("a")).await.unwrap();
    assert_eq!(stored.name, "Alice Wang");
}

#[tokio::test]
async fn invalid_profile_is_never_stored() {
    let db = setup().await;
    let mut bad = profile("a", "Alice");
    bad.name = String::new();

    let result = db.agents().register(&bad).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert_eq!(db.agents().count().await.unwrap(), 0);
}

#[tokio::test]
async fn agents_list_in_registration_order() {
    let db = setup().await;
    db.agents().register(&profile("zed", "Zed")).await.unwrap();
    db.agents().register(&profile("amy", "Amy")).await.unwrap();
    let ids: Vec<String> = db
        .agents()
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id.0)
        .collect();
    assert_eq!(ids, vec!["zed".to_owned(), "amy".to_owned()]);
}

// =============================================================================
// Memories
// =============================================================================

#[tokio::test]
async fn importance_is_clamped_on_append() {
    let (db, a, _) = setup_with_agents().await;

    let stored = db
        .memories()
        .append(&NewMemory::new(&a, MemoryKind::ConversationEcho, "said hi", 11))
        .await
        .unwrap();
    assert_eq!(stored.importance, 10);

    let low = db
        .memories()
        .append(&NewMemory::new(&a, MemoryKind::Observation, "noticed rain", -3))
        .await
        .unwrap();
    assert_eq!(low.importance, 1);

    let read = db.memories().query(&a, MemoryQuery::recent(10)).await.unwrap();
    let importances: Vec<u8> = read.iter().map(|m| m.importance).collect();
    assert_eq!(importances, vec![1, 10]);
}

#[tokio::test]
async fn memory_for_unknown_agent_is_rejected() {
    let db = setup().await;
    let ghost = AgentId::new("ghost");
    let result = db
        .memories()
        .append(&NewMemory::new(&ghost, MemoryKind::Action, "walked", 5))
        .await;
    assert!(matches!(result, Err(StoreError::UnknownAgent(_))));
}

#[tokio::test]
async fn query_filters_combine() {
    let (db, a, b) = setup_with_agents().await;
    let store = db.memories();
    store.append(&NewMemory::new(&a, MemoryKind::Learning, "old lesson", 5)).await.unwrap();
    let marker = store
        .append(&NewMemory::new(&a, MemoryKind::Action, "cooked", 3))
        .await
        .unwrap();
    store.append(&NewMemory::new(&a, MemoryKind::Learning, "new lesson", 6)).await.unwrap();
    store.append(&NewMemory::new(&b, MemoryKind::Learning, "not mine", 6)).await.unwrap();

    let learning = store
        .query(&a, MemoryQuery::recent(10).of_kind(MemoryKind::Learning))
        .await
        .unwrap();
    let contents: Vec<&str> = learning.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["new lesson", "old lesson"]);

    let since = store
        .query(
            &a,
            MemoryQuery::recent(10)
                .of_kind(MemoryKind::Learning)
                .since(marker.created_at),
        )
        .await
        .unwrap();
    assert_eq!(since.len(), 1);
    assert_eq!(since[0].content, "new lesson");

    let limited = store.query(&a, MemoryQuery::recent(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].content, "new lesson");
}

#[tokio::test]
async fn eviction_keeps_most_important_then_most_recent() {
    let (db, a, b) = setup_with_agents().await;
    let store = db.memories();

    let mut appended = Vec::new();
    for i in 0..101_i64 {
        let m = store
            .append(&NewMemory::new(&a, MemoryKind::Observation, format!("event {i}"), (i * 7) % 10 + 1))
            .await
            .unwrap();
        appended.push(m);
    }
    store.append(&NewMemory::new(&b, MemoryKind::Observation, "other agent", 1)).await.unwrap();

    let mut ranked = appended.clone();
    ranked.sort_by(|x, y| (y.importance, y.seq).cmp(&(x.importance, x.seq)));
    let expected: BTreeSet<String> = ranked.iter().take(80).map(|m| m.id.to_string()).collect();

    let remaining = store.all_for(&a).await.unwrap();
    let actual: BTreeSet<String> = remaining.iter().map(|m| m.id.to_string()).collect();

    assert_eq!(remaining.len(), 80);
    assert_eq!(actual, expected);
    assert_eq!(store.count(&b).await.unwrap(), 1, "other agents are untouched");
}

#[tokio::test]
async fn eviction_never_runs_at_or_below_high_water() {
    let (db, a, _) = setup_with_agents().await;
    let store = db.memories();
    for i in 0..100_i64 {
        store
            .append(&NewMemory::new(&a, MemoryKind::Action, format!("step {i}"), 2))
            .await
            .unwrap();
    }
    assert_eq!(store.count(&a).await.unwrap(), 100);
}

#[tokio::test]
async fn interleaved_appends_evict_per_agent() {
    let (mut db, a, b) = setup_with_agents().await;
    db.set_retention(RetentionPolicy {
        high_water: 6,
        retain: 4,
    })
    .unwrap();
    let store = db.memories();

    for i in 0..10_i64 {
        store
            .append(&NewMemory::new(&a, MemoryKind::Action, format!("a step {i}"), 2))
            .await
            .unwrap();
        if i % 2 == 0 {
            store
                .append(&NewMemory::new(&b, MemoryKind::Action, format!("b step {i}"), 1))
                .await
                .unwrap();
        }
    }

    // A crossed the high-water mark twice; B never did.
    assert_eq!(store.count(&a).await.unwrap(), 4);
    let kept_b: Vec<String> = store
        .all_for(&b)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(kept_b.len(), 5);
    for i in [0, 2, 4, 6, 8] {
        assert!(kept_b.contains(&format!("b step {i}")));
    }

    let newest_a = store.query(&a, MemoryQuery::recent(1)).await.unwrap();
    assert_eq!(newest_a[0].content, "a step 9");
}

#[tokio::test]
async fn custom_retention_policy_applies() {
    let (mut db, a, _) = setup_with_agents().await;
    db.set_retention(RetentionPolicy {
        high_water: 5,
        retain: 3,
    })
    .unwrap();
    for i in 1..=6_i64 {
        db.memories()
            .append(&NewMemory::new(&a, MemoryKind::Action, format!("step {i}"), i))
            .await
            .unwrap();
    }
    let left: Vec<u8> = db
        .memories()
        .all_for(&a)
        .await
        .unwrap()
        .iter()
        .map(|m| m.importance)
        .collect();
    assert_eq!(left, vec![6, 5, 4]);
}

// =============================================================================
// Conversations
// =============================================================================

#[tokio::test]
async fn conversation_visibility_rules() {
    let (db, a, b) = setup_with_agents().await;
    db.agents().register(&profile("c", "Chen")).await.unwrap();
    let c = AgentId::new("c");
    let store = db.conversations();

    store.append(&broadcast(&a, "morning all")).await.unwrap();
    store
        .append(&NewConversation {
            from_agent: a.clone(),
            to_agent: Some(b.clone()),
            message: "how is the baby?".to_owned(),
            kind: ConversationKind::PrivateChat,
            metadata: serde_json::json!({"intent": "check in"}),
        })
        .await
        .unwrap();

    let for_b = store.query(&ConversationQuery::recent(10).visible_to(&b)).await.unwrap();
    assert_eq!(for_b.len(), 2);
    assert_eq!(for_b[0].message, "how is the baby?");
    assert_eq!(for_b[0].metadata["intent"], "check in");

    let for_c = store.query(&ConversationQuery::recent(10).visible_to(&c)).await.unwrap();
    assert_eq!(for_c.len(), 1);
    assert!(for_c[0].is_broadcast());

    let others_for_a = store
        .query(&ConversationQuery::recent(10).visible_to(&a).excluding_own())
        .await
        .unwrap();
    assert!(others_for_a.is_empty());

    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(store.query(&ConversationQuery::recent(10)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn conversation_to_unknown_agent_is_rejected() {
    let (db, a, _) = setup_with_agents().await;
    let mut msg = broadcast(&a, "hello?");
    msg.to_agent = Some(AgentId::new("nobody"));
    let result = db.conversations().append(&msg).await;
    assert!(matches!(result, Err(StoreError::UnknownAgent(_))));
    assert_eq!(db.conversations().count().await.unwrap(), 0);
}

#[tokio::test]
async fn conversation_stats_group_by_kind_and_speaker() {
    let (db, a, b) = setup_with_agents().await;
    let store = db.conversations();
    store.append(&broadcast(&a, "one")).await.unwrap();
    store.append(&broadcast(&a, "two")).await.unwrap();
    let mut help = broadcast(&b, "help please");
    help.kind = ConversationKind::HelpRequest;
    store.append(&help).await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_kind.get("group-chat"), Some(&2));
    assert_eq!(stats.by_kind.get("help-request"), Some(&1));
    assert_eq!(stats.by_agent.get("a"), Some(&2));
    assert_eq!(stats.by_agent.get("b"), Some(&1));
}

// =============================================================================
// Plans
// =============================================================================

#[tokio::test]
async fn new_plan_supersedes_old() {
    let (db, a, _) = setup_with_agents().await;
    let plans = db.plans();
    let first = Plan::new(&a, vec![step("feed the baby", 9)], "morning");
    let second = Plan::new(&a, vec![step("chat with the group", 4)], "afternoon");
    plans.append(&first).await.unwrap();
    plans.append(&second).await.unwrap();

    let current = plans.current(&a).await.unwrap().unwrap();
    assert_eq!(current.id, second.id);

    let all = plans.list(&a).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[1].superseded);
}

#[tokio::test]
async fn plan_status_updates_in_place() {
    let (db, a, _) = setup_with_agents().await;
    let plans = db.plans();
    let plan = Plan::new(&a, vec![step("feed the baby", 9), step("watch a video", 3)], "day");
    plans.append(&plan).await.unwrap();

    plans.update_action_status(plan.id, 1, PlanStatus::InProgress).await.unwrap();
    let stored = plans.current(&a).await.unwrap().unwrap();
    assert_eq!(stored.actions[0].status, PlanStatus::Pending);
    assert_eq!(stored.actions[1].status, PlanStatus::InProgress);

    plans.update_status(plan.id, PlanStatus::Completed).await.unwrap();
    let stored = plans.current(&a).await.unwrap().unwrap();
    assert!(stored.actions.iter().all(|s| s.status == PlanStatus::Completed));

    let missing = plans.update_action_status(plan.id, 7, PlanStatus::Completed).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn out_of_range_priority_is_rejected() {
    let (db, a, _) = setup_with_agents().await;
    let plan = Plan::new(&a, vec![step("feed the baby", 11)], "bad");
    let result = db.plans().append(&plan).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert!(db.plans().current(&a).await.unwrap().is_none());
}

#[tokio::test]
async fn prune_keeps_current_and_newest_superseded() {
    let (db, a, _) = setup_with_agents().await;
    let plans = db.plans();
    for i in 0..5 {
        plans
            .append(&Plan::new(&a, vec![step("rest for a bit", 2)], format!("plan {i}")))
            .await
            .unwrap();
    }
    let removed = plans.prune(&a, 2).await.unwrap();
    assert_eq!(removed, 2);

    let left: Vec<String> = plans.list(&a).await.unwrap().into_iter().map(|p| p.context).collect();
    assert_eq!(left, vec!["plan 4", "plan 3", "plan 2"]);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn clear_history_keeps_agents() {
    let (db, a, _) = setup_with_agents().await;
    db.memories().append(&NewMemory::new(&a, MemoryKind::Action, "x", 3)).await.unwrap();
    db.conversations().append(&broadcast(&a, "hi")).await.unwrap();
    db.plans().append(&Plan::new(&a, vec![step("nap", 2)], "p")).await.unwrap();

    db.clear_history().await.unwrap();

    assert_eq!(db.agents().count().await.unwrap(), 2);
    assert_eq!(db.memories().count(&a).await.unwrap(), 0);
    assert_eq!(db.conversations().count().await.unwrap(), 0);
    assert!(db.plans().current(&a).await.unwrap().is_none());
}

#[tokio::test]
async fn writes_fail_cleanly_after_close() {
    let (db, a, _) = setup_with_agents().await;
    db.close().await;
    let result = db
        .memories()
        .append(&NewMemory::new(&a, MemoryKind::Action, "too late", 3))
        .await;
    assert!(matches!(result, Err(StoreError::Database(_))));
}

#[tokio::test]
async fn file_store_persists_across_connections() {
    let dir = std::env::temp_dir().join(format!("hamlet_store_test_{}", std::process::id()));
    let path = dir.join("nested").join("hamlet.sqlite");
    let config = StoreConfig::new(&path).with_max_connections(2);

    {
        let db = Database::connect(&config).await.unwrap();
        db.run_migrations().await.unwrap();
        db.agents().register(&profile("a", "Alice")).await.unwrap();
        db.close().await;
    }

    let db = Database::connect(&config).await.unwrap();
    db.run_migrations().await.unwrap();
    assert_eq!(db.agents().count().await.unwrap(), 1);
    db.close().await;

    std::fs::remove_dir_all(&dir).ok();
}
