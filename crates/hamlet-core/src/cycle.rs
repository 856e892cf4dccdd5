//! The per-agent cycle: Observing, Planning, Executing, Reflecting, Done.
//!
//! A cycle runs for exactly one agent and always reaches [`CyclePhase::Done`]
//! unless the entity store fails. Oracle failures never abort a cycle; the
//! [`OracleAdapter`] has already replaced them with the phase's fallback by
//! the time a decision reaches this module. Store failures end the cycle
//! with a [`CycleError`], which the scheduler logs before moving on to the
//! next agent.
//!
//! # Phase effects
//!
//! | Phase | Writes |
//! |---|---|
//! | Observing | at most one `observation` memory |
//! | Planning | at most one plan and its `plan` memory |
//! | Executing | `action`, `learning`, `concern`, `conversation-echo`, `plan-update` memories; at most one conversation |
//! | Reflecting | at most one `reflection` memory |
//! | Done | nothing; bumps the cycle counter |

use std::cmp::Reverse;

use chrono::Utc;
use hamlet_agents::memory::{prompt_lines, relevant_memories};
use hamlet_agents::salience::{assess_message, is_important};
use hamlet_agents::{AgentError, RuntimeState};
use hamlet_oracle::parse::REFLECTION_IMPORTANCE;
use hamlet_oracle::{Oracle, OracleAdapter, fallback};
use hamlet_store::{ConversationQuery, Database, MemoryQuery, StoreError};
use hamlet_types::{
    ActionKind, AgentId, AgentProfile, Child, Conversation, ConversationKind, MemoryKind,
    NewConversation, NewMemory, Observation, Plan, PlanId, PlanStatus, PlannedAction,
    SocialObservation,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::HamletConfig;
use crate::context::{agent_context, extend};
use crate::decision::{DecisionMode, Dice};
use crate::state::SimulationState;

/// Other agents' conversations sampled per observation.
pub const OBSERVED_CONVERSATIONS: u32 = 10;

/// Own memories included in an observation.
pub const OBSERVED_MEMORIES: u32 = 5;

/// Memories a reflection looks back over.
pub const REFLECTION_WINDOW: u32 = 5;

/// Relevant memories pulled into a dialogue prompt.
pub const DIALOGUE_MEMORIES: usize = 3;

/// Importance of `action` memories.
const ACTION_IMPORTANCE: i64 = 5;
/// Importance of a speaker's own `conversation-echo`.
const ECHO_IMPORTANCE: i64 = 4;
/// Importance of the echo of a help request.
const HELP_ECHO_IMPORTANCE: i64 = 6;
/// Importance of `learning` memories.
const LEARNING_IMPORTANCE: i64 = 6;
/// Importance of `concern` memories.
const CONCERN_IMPORTANCE: u8 = 8;
/// Importance of `plan-update` memories.
const PLAN_UPDATE_IMPORTANCE: i64 = 3;
/// Reflection importance under the threshold policy.
const THRESHOLD_REFLECTION_IMPORTANCE: u8 = 5;

/// Words in a digital-activity intention that make it a learning moment.
const LEARNING_CUES: &[&str] = &["learn", "knowledge", "tip", "how to"];

/// Errors that end a cycle early.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// The entity store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// Memory retrieval failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// The phases of one cycle, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CyclePhase {
    /// Gather recent activity, time, and own memories.
    Observing,
    /// Decide whether to write a new plan.
    Planning,
    /// Carry out one action.
    Executing,
    /// Decide whether to write a reflection.
    Reflecting,
    /// Terminal.
    Done,
}

impl CyclePhase {
    /// The single successor. `Done` is its own successor.
    pub const fn next(self) -> Self {
        match self {
            Self::Observing => Self::Planning,
            Self::Planning => Self::Executing,
            Self::Executing => Self::Reflecting,
            Self::Reflecting | Self::Done => Self::Done,
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    /// The agent the cycle ran for.
    pub agent_id: AgentId,
    /// Phases entered, in order.
    pub phases: Vec<CyclePhase>,
    /// Memories appended.
    pub memories_written: u32,
    /// The conversation produced, if any.
    pub conversation: Option<Conversation>,
    /// The plan created, if any.
    pub new_plan: Option<PlanId>,
    /// The executing branch that acted, if any. A childcare decision for an
    /// agent without children leaves this empty.
    pub action: Option<ActionKind>,
}

impl CycleOutcome {
    fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            phases: Vec::with_capacity(5),
            memories_written: 0,
            conversation: None,
            new_plan: None,
            action: None,
        }
    }

    /// Whether the cycle ran to `Done`.
    pub fn completed(&self) -> bool {
        self.phases.last() == Some(&CyclePhase::Done)
    }
}

/// Everything a cycle needs besides the simulation state.
pub struct CycleEnv<'a, O> {
    /// The entity store.
    pub db: &'a Database,
    /// The oracle boundary.
    pub oracle: &'a OracleAdapter<O>,
    /// Run configuration.
    pub config: &'a HamletConfig,
    /// All registered profiles, for names and conversation targets.
    pub roster: &'a [AgentProfile],
    /// Seeded randomness for threshold policies and topic picks.
    pub dice: &'a mut Dice,
}

/// Run one full cycle for `profile`.
///
/// The agent's runtime state is taken from `state`, mutated, and put back
/// even when the cycle fails part way.
///
/// # Errors
///
/// Returns [`CycleError`] when the entity store fails. Effects committed
/// before the failure stay committed.
pub async fn run_cycle<O: Oracle>(
    env: &mut CycleEnv<'_, O>,
    state: &mut SimulationState,
    profile: &AgentProfile,
) -> Result<CycleOutcome, CycleError> {
    let runtime = state
        .agent_states
        .remove(&profile.id)
        .unwrap_or_else(|| RuntimeState::new(profile.id.clone(), &env.config.runtime));
    let observation = Observation {
        tick: state.tick_count,
        day: state.day,
        hour: state.hour,
        time_of_day: state.time_of_day,
        social: Vec::new(),
        recent_memories: Vec::new(),
        global_event: state.global_event.clone(),
    };

    let mut cycle = Cycle {
        env,
        state,
        profile,
        runtime,
        observation,
        outcome: CycleOutcome::new(profile.id.clone()),
    };
    let result = cycle.run().await;
    let Cycle {
        state,
        runtime,
        outcome,
        ..
    } = cycle;
    state.agent_states.insert(profile.id.clone(), runtime);
    result.map(|()| outcome)
}

/// What the executing phase is about to do.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Intent {
    kind: ActionKind,
    intention: String,
    motivation: String,
    target: Option<String>,
}

impl Intent {
    fn rest(reason: &str) -> Self {
        Self {
            kind: ActionKind::Rest,
            intention: "take a break".to_owned(),
            motivation: reason.to_owned(),
            target: None,
        }
    }
}

struct Cycle<'c, 'e, O> {
    env: &'c mut CycleEnv<'e, O>,
    state: &'c mut SimulationState,
    profile: &'c AgentProfile,
    runtime: RuntimeState,
    observation: Observation,
    outcome: CycleOutcome,
}

impl<O: Oracle> Cycle<'_, '_, O> {
    async fn run(&mut self) -> Result<(), CycleError> {
        let mut phase = CyclePhase::Observing;
        loop {
            self.outcome.phases.push(phase);
            debug!(agent_id = %self.profile.id, ?phase, "Entering phase");
            match phase {
                CyclePhase::Observing => self.observe().await?,
                CyclePhase::Planning => self.plan().await?,
                CyclePhase::Executing => Box::pin(self.execute()).await?,
                CyclePhase::Reflecting => self.reflect().await?,
                CyclePhase::Done => {
                    self.runtime.cycles_completed = self.runtime.cycles_completed.saturating_add(1);
                    return Ok(());
                }
            }
            phase = phase.next();
        }
    }

    const fn id(&self) -> &AgentId {
        &self.profile.id
    }

    fn context(&self) -> Value {
        agent_context(self.profile, &self.runtime, &self.observation)
    }

    fn name_of(&self, id: &AgentId) -> String {
        self.env
            .roster
            .iter()
            .find(|p| &p.id == id)
            .map_or_else(|| id.to_string(), |p| p.name.clone())
    }

    // -----------------------------------------------------------------------
    // Observing
    // -----------------------------------------------------------------------

    async fn observe(&mut self) -> Result<(), CycleError> {
        let db = self.env.db;
        let query = ConversationQuery::recent(OBSERVED_CONVERSATIONS)
            .visible_to(self.id())
            .excluding_own();
        let conversations = db.conversations().query(&query).await?;
        let memories = db
            .memories()
            .query(self.id(), MemoryQuery::recent(OBSERVED_MEMORIES))
            .await?;

        let mut flagged = Vec::new();
        let mut social = Vec::with_capacity(conversations.len());
        for conv in &conversations {
            let importance = assess_message(&conv.message);
            let item = SocialObservation {
                from_agent: conv.from_agent.clone(),
                from_name: self.name_of(&conv.from_agent),
                message: conv.message.clone(),
                direct: conv.to_agent.as_ref() == Some(self.id()),
                importance,
            };
            if is_important(importance) && self.runtime.is_unobserved(conv.seq) {
                flagged.push(item.clone());
            }
            social.push(item);
        }
        if let Some(newest) = conversations.iter().map(|c| c.seq).max() {
            self.runtime.mark_observed(newest);
        }

        if let Some(max) = flagged.iter().map(|s| s.importance).max() {
            let content = flagged
                .iter()
                .map(|s| format!("{} said: {}", s.from_name, s.message))
                .collect::<Vec<_>>()
                .join(" | ");
            self.remember(MemoryKind::Observation, format!("Noticed: {content}"), i64::from(max))
                .await?;
        }

        debug!(
            agent_id = %self.profile.id,
            social = social.len(),
            flagged = flagged.len(),
            memories = memories.len(),
            "Observed"
        );
        self.observation.social = social;
        self.observation.recent_memories = memories;
        self.runtime.current_observation = Some(self.observation.clone());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    async fn plan(&mut self) -> Result<(), CycleError> {
        let has_pending = self.next_step().is_some();

        let (should_plan, reason) = if !has_pending {
            (true, "no pending plan actions".to_owned())
        } else {
            match self.env.config.policy.planning {
                DecisionMode::Threshold => (
                    self.env.dice.roll(self.env.config.policy.plan_probability),
                    "periodic replanning".to_owned(),
                ),
                DecisionMode::Oracle => {
                    let decision = self.env.oracle.should_plan(&self.context()).await;
                    (decision.should_plan, decision.reason)
                }
            }
        };
        if !should_plan {
            debug!(agent_id = %self.profile.id, reason = %reason, "No new plan");
            return Ok(());
        }

        let mut actions = self.env.oracle.plan(&self.context(), self.profile).await;
        let before = actions.len();
        actions.retain(|a| self.profile.can_do(a.kind));
        if actions.len() < before {
            debug!(
                agent_id = %self.profile.id,
                dropped = before.saturating_sub(actions.len()),
                "Dropped steps the agent cannot do"
            );
        }
        if actions.is_empty() {
            actions = fallback::plan_for(self.profile);
        }
        let plan = Plan::new(self.id(), actions, reason);
        self.env.db.plans().append(&plan).await?;

        let steps = plan
            .actions
            .iter()
            .map(|a| a.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        self.remember(
            MemoryKind::Plan,
            format!("Made a plan: {steps}"),
            i64::from(plan.max_priority()),
        )
        .await?;

        info!(
            agent_id = %self.profile.id,
            plan_id = %plan.id,
            actions = plan.actions.len(),
            "New plan"
        );
        self.outcome.new_plan = Some(plan.id);
        self.runtime.current_plan = Some(plan);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Executing
    // -----------------------------------------------------------------------

    async fn execute(&mut self) -> Result<(), CycleError> {
        let intent = self.decide().await;
        debug!(
            agent_id = %self.profile.id,
            kind = %intent.kind,
            intention = %intent.intention,
            "Executing"
        );

        let acted = match intent.kind {
            ActionKind::Conversation => self.converse(&intent).await?,
            ActionKind::DigitalActivity => self.browse(&intent).await?,
            ActionKind::Childcare => self.look_after_child(&intent).await?,
            ActionKind::Learning => self.study(&intent).await?,
            ActionKind::Rest => {
                self.runtime.rest(&self.env.config.runtime);
                self.runtime.touch(Utc::now(), ActionKind::Rest);
                self.outcome.action = Some(ActionKind::Rest);
                return Ok(());
            }
        };
        if !acted {
            return Ok(());
        }

        self.runtime.spend_energy(&self.env.config.runtime);
        self.runtime.touch(Utc::now(), intent.kind);
        self.outcome.action = Some(intent.kind);
        self.complete_step(intent.kind).await
    }

    /// The oracle's choice, else the plan's next step, else rest.
    async fn decide(&self) -> Intent {
        let others: Vec<&str> = self
            .env
            .roster
            .iter()
            .filter(|p| p.id != self.profile.id)
            .map(|p| p.name.as_str())
            .collect();
        let context = extend(self.context(), json!({ "others": others }));

        match self.env.oracle.decide_action(&context).await {
            Some(decision) if !decision.should_act => Intent::rest("chose not to act"),
            Some(decision) => Intent {
                kind: decision.kind,
                intention: decision.intention,
                motivation: decision.motivation,
                target: decision.target,
            },
            None => self.next_step().map_or_else(
                    || Intent::rest("nothing planned"),
                    |(_, step)| Intent {
                        kind: step.kind,
                        intention: step.description.clone(),
                        motivation: "following my plan".to_owned(),
                        target: None,
                    },
                ),
        }
    }

    /// The plan's next pending step this agent can actually carry out.
    fn next_step(&self) -> Option<(usize, &PlannedAction)> {
        let profile = self.profile;
        self.runtime
            .current_plan
            .as_ref()
            .and_then(|p| p.next_pending_where(|a| profile.can_do(a.kind)))
    }

    async fn converse(&mut self, intent: &Intent) -> Result<bool, CycleError> {
        let target = intent
            .target
            .as_deref()
            .and_then(|t| resolve_target(self.env.roster, t, self.id()));
        let (to_agent, kind, audience) = match target {
            Some(p) => (Some(p.id.clone()), ConversationKind::PrivateChat, p.name.clone()),
            None => (None, ConversationKind::GroupChat, "the group".to_owned()),
        };

        let relevant =
            relevant_memories(self.env.db, self.id(), &intent.intention, DIALOGUE_MEMORIES).await?;
        let mut extra = json!({
            "intent": intent.intention,
            "motivation": intent.motivation,
            "target": target.map(|p| p.name.as_str()),
        });
        if !relevant.is_empty()
            && let Value::Object(map) = &mut extra
        {
            map.insert("memories".to_owned(), json!(prompt_lines(&relevant)));
        }
        let context = extend(self.context(), extra);
        let message = self.env.oracle.dialogue(&context, fallback::GREETING).await;

        self.say(to_agent, kind, message.clone(), json!({ "intention": intent.intention }))
            .await?;
        self.remember(
            MemoryKind::Action,
            format!("Talked with {audience} about {}", intent.intention),
            ACTION_IMPORTANCE,
        )
        .await?;
        self.remember(
            MemoryKind::ConversationEcho,
            format!("I said to {audience}: {message}"),
            ECHO_IMPORTANCE,
        )
        .await?;
        Ok(true)
    }

    async fn browse(&mut self, intent: &Intent) -> Result<bool, CycleError> {
        let profile = self.profile;
        let habits = &profile.personality.digital_habits;
        let lower = intent.intention.to_lowercase();
        let platform = habits
            .preferred_platforms
            .iter()
            .find(|p| lower.contains(&p.to_lowercase()))
            .or_else(|| habits.preferred_platforms.first())
            .map_or("video app", String::as_str)
            .to_owned();
        let topic = self
            .env
            .dice
            .pick(&habits.video_preferences)
            .or_else(|| self.env.dice.pick(&profile.personality.interests))
            .map_or("everyday life", String::as_str)
            .to_owned();

        self.remember(
            MemoryKind::Action,
            format!("Spent time on {platform} watching videos about {topic}"),
            ACTION_IMPORTANCE,
        )
        .await?;

        if LEARNING_CUES.iter().any(|cue| lower.contains(cue)) {
            let context = extend(
                self.context(),
                json!({ "topic": topic, "platform": platform }),
            );
            let note = self.env.oracle.learning_note(&context, &topic).await;
            self.remember(MemoryKind::Learning, note, LEARNING_IMPORTANCE)
                .await?;
        }
        Ok(true)
    }

    async fn look_after_child(&mut self, intent: &Intent) -> Result<bool, CycleError> {
        let profile = self.profile;
        let Some(child) = profile.children.first() else {
            debug!(agent_id = %self.profile.id, "No children; childcare is a no-op");
            return Ok(false);
        };

        let context = extend(
            self.context(),
            json!({
                "child": { "name": child.name, "age": child.age },
                "activity": intent.intention,
            }),
        );
        let judgement = self.env.oracle.concern(&context).await;
        self.remember(
            MemoryKind::Action,
            format!("Looked after {}: {}", child.name, intent.intention),
            ACTION_IMPORTANCE,
        )
        .await?;

        if judgement.concerned {
            let concern = judgement
                .concern
                .unwrap_or_else(|| format!("how {} is doing", child.name));
            self.raise_concern(child, &concern, context).await?;
        }
        Ok(true)
    }

    async fn raise_concern(
        &mut self,
        child: &Child,
        concern: &str,
        context: Value,
    ) -> Result<(), CycleError> {
        self.remember(
            MemoryKind::Concern,
            format!("Worried about {}: {concern}", child.name),
            i64::from(CONCERN_IMPORTANCE),
        )
        .await?;
        self.runtime.set_emotion("worried");
        info!(agent_id = %self.profile.id, child = %child.name, concern, "Concern raised");

        let context = extend(
            context,
            json!({ "intent": "ask the community for advice", "concern": concern }),
        );
        let message = self
            .env
            .oracle
            .dialogue(&context, &fallback::help_request(concern))
            .await;
        self.say(
            None,
            ConversationKind::HelpRequest,
            message.clone(),
            json!({ "concern": concern, "child": child.name }),
        )
        .await?;
        self.remember(
            MemoryKind::ConversationEcho,
            format!("I asked the group for help: {message}"),
            HELP_ECHO_IMPORTANCE,
        )
        .await?;
        Ok(())
    }

    async fn study(&mut self, intent: &Intent) -> Result<bool, CycleError> {
        let profile = self.profile;
        let topic = self
            .env
            .dice
            .pick(&profile.learning_interests)
            .or_else(|| self.env.dice.pick(&profile.personality.interests))
            .map_or("everyday skills", String::as_str)
            .to_owned();
        let context = extend(
            self.context(),
            json!({ "topic": topic, "intent": intent.intention }),
        );
        let note = self.env.oracle.learning_note(&context, &topic).await;
        self.remember(MemoryKind::Learning, note, LEARNING_IMPORTANCE)
            .await?;
        self.remember(
            MemoryKind::Action,
            format!("Spent time learning about {topic}"),
            ACTION_IMPORTANCE,
        )
        .await?;
        Ok(true)
    }

    /// Mark the highest-priority pending step of `kind` as completed.
    async fn complete_step(&mut self, kind: ActionKind) -> Result<(), CycleError> {
        let Some(plan) = self.runtime.current_plan.as_ref() else {
            return Ok(());
        };
        let Some((index, description)) = plan
            .actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.status == PlanStatus::Pending && a.kind == kind)
            .min_by_key(|(i, a)| (Reverse(a.priority), *i))
            .map(|(i, a)| (i, a.description.clone()))
        else {
            return Ok(());
        };
        let plan_id = plan.id;

        self.env
            .db
            .plans()
            .update_action_status(plan_id, index, PlanStatus::Completed)
            .await?;
        if let Some(step) = self
            .runtime
            .current_plan
            .as_mut()
            .and_then(|p| p.actions.get_mut(index))
        {
            step.status = PlanStatus::Completed;
        }
        self.remember(
            MemoryKind::PlanUpdate,
            format!("Completed: {description}"),
            PLAN_UPDATE_IMPORTANCE,
        )
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reflecting
    // -----------------------------------------------------------------------

    async fn reflect(&mut self) -> Result<(), CycleError> {
        let (should_reflect, importance, reason) = match self.env.config.policy.reflection {
            DecisionMode::Threshold => (
                self.env.dice.roll(self.env.config.policy.reflect_probability),
                THRESHOLD_REFLECTION_IMPORTANCE,
                String::new(),
            ),
            DecisionMode::Oracle => {
                let decision = self.env.oracle.should_reflect(&self.context()).await;
                if let Some(emotion) = &decision.emotional_state {
                    self.runtime.set_emotion(emotion);
                }
                (decision.should_reflect, decision.importance, decision.reason)
            }
        };
        if !should_reflect {
            return Ok(());
        }

        let recent = self
            .env
            .db
            .memories()
            .query(self.id(), MemoryQuery::recent(REFLECTION_WINDOW))
            .await?;
        let context = extend(
            self.context(),
            json!({ "memories": prompt_lines(&recent), "reason": reason }),
        );
        let text = self.env.oracle.reflection(&context).await;
        let (low, high) = REFLECTION_IMPORTANCE;
        let importance = importance.clamp(low, high);
        self.remember(MemoryKind::Reflection, text, i64::from(importance))
            .await?;
        debug!(agent_id = %self.profile.id, importance, "Reflected");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    async fn remember(
        &mut self,
        kind: MemoryKind,
        content: String,
        importance: i64,
    ) -> Result<(), CycleError> {
        let memory = NewMemory::new(self.id(), kind, content, importance).with_metadata(json!({
            "tick": self.state.tick_count,
            "day": self.state.day,
        }));
        match self.env.db.memories().append(&memory).await {
            Ok(stored) => {
                self.outcome.memories_written = self.outcome.memories_written.saturating_add(1);
                debug!(
                    agent_id = %self.profile.id,
                    kind = %stored.kind,
                    importance = stored.importance,
                    "Memory stored"
                );
                Ok(())
            }
            Err(err) => {
                warn!(agent_id = %self.profile.id, %kind, error = %err, "Memory write failed");
                Err(err.into())
            }
        }
    }

    /// Append a conversation, count it, and deliver it to every runtime
    /// state that can see it.
    async fn say(
        &mut self,
        to_agent: Option<AgentId>,
        kind: ConversationKind,
        message: String,
        metadata: Value,
    ) -> Result<(), CycleError> {
        let new = NewConversation {
            from_agent: self.profile.id.clone(),
            to_agent,
            message,
            kind,
            metadata,
        };
        let conversation = self.env.db.conversations().append(&new).await?;
        self.state.conversation_count = self.state.conversation_count.saturating_add(1);

        let config = &self.env.config.runtime;
        self.runtime
            .record_conversation(conversation.clone(), config);
        for (agent, runtime) in &mut self.state.agent_states {
            if conversation.visible_to(agent) {
                runtime.record_conversation(conversation.clone(), config);
            }
        }

        info!(
            agent_id = %self.profile.id,
            to = ?conversation.to_agent.as_ref().map(AgentId::as_str),
            kind = %conversation.kind,
            count = self.state.conversation_count,
            "Conversation"
        );
        self.outcome.conversation = Some(conversation);
        Ok(())
    }
}

/// Find the registered agent a decision addressed, by name or id. The
/// speaker never addresses itself.
fn resolve_target<'a>(
    roster: &'a [AgentProfile],
    target: &str,
    speaker: &AgentId,
) -> Option<&'a AgentProfile> {
    let wanted = target.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    roster.iter().filter(|p| &p.id != speaker).find(|p| {
        p.id.as_str().to_lowercase() == wanted || p.name.to_lowercase() == wanted
    })
}
