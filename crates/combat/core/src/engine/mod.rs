//! Command entry points.
//!
//! [`CombatEngine`] owns the encounter state, the event bus, and the rule
//! hooks. Each command builds a short-lived [`CombatContext`] over them, runs
//! the pipeline to completion (reaction windows included), and returns. No
//! command leaves work in flight.

mod context;
mod error;

pub use error::EngineError;

pub(crate) use context::CombatContext;

use std::sync::Arc;

use crate::action::{EffectOutcome, ExecutionMode, MovementOutcome, TargetSelection};
use crate::env::{CombatEnv, DecisionSource};
use crate::event::{CombatEvent, EventBus, EventSubscriber, RuleHook, RuleHooks, SubscriptionId, Topic};
use crate::state::{AbilityId, CombatState, Combatant, CombatantId, CombatantSnapshot, GridPos};
#[cfg(feature = "serde")]
use crate::state::EncounterSnapshot;
use crate::turn::InitiativeOrder;

/// Deterministic, single-threaded combat rules engine for one encounter.
pub struct CombatEngine<'a> {
    env: CombatEnv<'a>,
    state: CombatState,
    decisions: Box<dyn DecisionSource + 'a>,
    events: EventBus,
    hooks: RuleHooks,
}

impl<'a> CombatEngine<'a> {
    /// Creates an engine with an empty encounter seeded by `seed`.
    pub fn new(env: CombatEnv<'a>, seed: u64, decisions: impl DecisionSource + 'a) -> Self {
        Self {
            events: EventBus::with_capacity(env.config().event_log_capacity),
            env,
            state: CombatState::new(seed),
            decisions: Box::new(decisions),
            hooks: RuleHooks::default(),
        }
    }

    /// Replaces the reaction decision source (e.g. swapping a human for an AI).
    pub fn set_decision_source(&mut self, decisions: impl DecisionSource + 'a) {
        self.decisions = Box::new(decisions);
    }

    fn context(&mut self) -> CombatContext<'_, 'a> {
        CombatContext::new(
            &mut self.state,
            self.env,
            self.decisions.as_mut(),
            &mut self.events,
            &self.hooks,
        )
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Registers combatants, fixes the turn order, and starts the first turn.
    pub fn begin_encounter(
        &mut self,
        combatants: Vec<Combatant>,
        order: InitiativeOrder,
    ) -> Result<(), EngineError> {
        self.context().begin_encounter_in(combatants, order)
    }

    /// Uses `ability` on the actor's turn.
    ///
    /// A [`ValidationError`](crate::action::ValidationError) leaves the
    /// state untouched.
    pub fn execute_ability(
        &mut self,
        actor: CombatantId,
        ability: &AbilityId,
        targets: TargetSelection,
    ) -> Result<EffectOutcome, EngineError> {
        let mut ctx = self.context();
        let outcome = ctx.execute_ability_in(actor, ability, targets, ExecutionMode::Turn)?;
        ctx.check_encounter_end();
        Ok(outcome)
    }

    /// Walks the actor along `path`, one tile per step.
    pub fn execute_movement(
        &mut self,
        actor: CombatantId,
        path: &[GridPos],
    ) -> Result<MovementOutcome, EngineError> {
        let mut ctx = self.context();
        let outcome = ctx.execute_movement_in(actor, path)?;
        ctx.check_encounter_end();
        Ok(outcome)
    }

    /// Closes the actor's turn and starts the next one.
    pub fn end_turn(&mut self, actor: CombatantId) -> Result<(), EngineError> {
        self.context().end_turn_in(actor)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Read-only copy of one combatant with derived values resolved.
    pub fn snapshot(&self, id: CombatantId) -> Option<CombatantSnapshot> {
        let definitions = self.env.definitions().ok()?;
        CombatantSnapshot::capture(&self.state, id, definitions)
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn current_actor(&self) -> Option<CombatantId> {
        self.state.current_actor()
    }

    pub fn env(&self) -> CombatEnv<'a> {
        self.env
    }

    /// Retained replay log, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.log()
    }

    // ========================================================================
    // Subscriptions and hooks
    // ========================================================================

    pub fn subscribe(&mut self, topics: &[Topic], subscriber: impl EventSubscriber + 'static) -> SubscriptionId {
        self.events.subscribe(topics, subscriber)
    }

    pub fn subscribe_all(&mut self, subscriber: impl EventSubscriber + 'static) -> SubscriptionId {
        self.events.subscribe_all(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Adds a rule-window hook; hooks run in ascending priority.
    pub fn add_rule_hook(&mut self, hook: Arc<dyn RuleHook>) {
        self.hooks.add(hook);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Captures the encounter, including the dice roll index.
    #[cfg(feature = "serde")]
    pub fn save(&self) -> EncounterSnapshot {
        EncounterSnapshot::capture(&self.state)
    }

    /// Replaces the encounter with `snapshot`. Subscribers and hooks are kept;
    /// the replay log is cleared.
    #[cfg(feature = "serde")]
    pub fn restore(&mut self, snapshot: EncounterSnapshot) {
        tracing::info!(
            round = snapshot.state.round(),
            roll_index = snapshot.state.dice.roll_index,
            "encounter restored"
        );
        self.state = snapshot.state;
        self.events.clear_log();
    }
}

impl std::fmt::Debug for CombatEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatEngine")
            .field("env", &self.env)
            .field("phase", &self.state.phase)
            .field("round", &self.state.round())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
