//! Per-command execution context.
//!
//! Every rule-window routine (damage, status lifecycle, trigger windows,
//! concentration, surfaces, turn flow) is a method on [`CombatContext`], so a
//! single command threads one mutable view of the encounter through the whole
//! pipeline.

use std::collections::BTreeSet;

use crate::env::{CombatEnv, DecisionSource, DefinitionOracle, OracleError};
use crate::event::{CombatEvent, EventBus, EventKind, RuleHooks};
use crate::reaction::{PendingEffect, ResolutionStack};
use crate::roll::{DiceExpr, DiceOutcome, RollCheck, RollResult, SeededRoller};
use crate::state::{CombatState, Combatant, CombatantId, StatusInstanceId};
use crate::status::ConditionSet;

use super::EngineError;

pub(crate) struct CombatContext<'c, 'e> {
    pub state: &'c mut CombatState,
    pub env: CombatEnv<'e>,
    pub decisions: &'c mut (dyn DecisionSource + 'e),
    pub events: &'c mut EventBus,
    pub hooks: &'c RuleHooks,
    pub stack: ResolutionStack<PendingEffect>,
    /// Nesting level of reaction-driven ability executions.
    pub depth: usize,
    /// Status instances whose `on_remove` functors are running.
    pub removing: BTreeSet<StatusInstanceId>,
}

impl<'c, 'e> CombatContext<'c, 'e> {
    pub fn new(
        state: &'c mut CombatState,
        env: CombatEnv<'e>,
        decisions: &'c mut (dyn DecisionSource + 'e),
        events: &'c mut EventBus,
        hooks: &'c RuleHooks,
    ) -> Self {
        Self {
            state,
            env,
            decisions,
            events,
            hooks,
            stack: ResolutionStack::new(),
            depth: 0,
            removing: BTreeSet::new(),
        }
    }

    /// Definitions live for the engine's lifetime, not the context borrow.
    pub fn definitions(&self) -> Result<&'e dyn DefinitionOracle, OracleError> {
        self.env.definitions()
    }
}

impl CombatContext<'_, '_> {
    // ========================================================================
    // Events
    // ========================================================================

    pub fn emit(&mut self, kind: EventKind) {
        let seq = self.state.event_seq;
        self.state.event_seq += 1;
        let event = CombatEvent {
            seq,
            round: self.state.round(),
            kind,
        };
        tracing::trace!(seq, kind = ?event.kind, "event");
        self.events.publish(event);
    }

    /// Logs a data-integrity problem and publishes it as a `DataWarning`.
    pub fn warn_data(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "data warning");
        self.emit(EventKind::DataWarning { message });
    }

    // ========================================================================
    // Dice
    // ========================================================================

    pub fn roll_check(&mut self, check: RollCheck) -> Result<RollResult, OracleError> {
        let rng = self.env.rng()?;
        let mut roller = SeededRoller::new(rng, &mut self.state.dice);
        Ok(check.resolve(&mut roller))
    }

    pub fn roll_dice(&mut self, dice: &DiceExpr) -> Result<DiceOutcome, OracleError> {
        let rng = self.env.rng()?;
        let mut roller = SeededRoller::new(rng, &mut self.state.dice);
        Ok(dice.roll(&mut roller))
    }

    /// Rolls `dice` and clamps the total at zero.
    pub fn roll_amount(&mut self, dice: &DiceExpr) -> Result<u32, OracleError> {
        Ok(self.roll_dice(dice)?.total.max(0).unsigned_abs())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn combatant(&self, id: CombatantId) -> Result<&Combatant, EngineError> {
        self.state
            .combatant(id)
            .ok_or(EngineError::UnknownCombatant(id))
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Result<&mut Combatant, EngineError> {
        self.state
            .combatant_mut(id)
            .ok_or(EngineError::UnknownCombatant(id))
    }

    pub fn conditions(&self, id: CombatantId) -> Result<ConditionSet, OracleError> {
        Ok(self.state.conditions_of(id, self.env.definitions()?))
    }

    /// Alive and not incapacitated.
    pub fn can_act(&self, id: CombatantId) -> Result<bool, OracleError> {
        let alive = self.state.combatant(id).is_some_and(Combatant::is_alive);
        Ok(alive && !self.conditions(id)?.is_incapacitated())
    }
}
