//! The effect pipeline: validate, pay, resolve targets, apply effects in order.

mod effects;
mod movement;
mod rolls;
mod validate;

use crate::damage::DamageReport;
use crate::engine::{CombatContext, EngineError};
use crate::event::EventKind;
use crate::reaction::{PendingEffect, PendingItem, TriggerKind};
use crate::roll::RollResult;
use crate::state::{AbilityId, CombatantId, GridPos};
use crate::status::{ApplyOutcome, RemovalEvent};

use super::{Cooldown, TargetSelection, ValidationError};

pub(crate) use validate::ValidatedAbility;

/// Whether an ability is used on the actor's own turn or as a reaction.
///
/// Reaction uses skip the turn check and the ability's own cost; the
/// reaction definition's cost has already been paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    Turn,
    Reaction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitOutcome {
    Miss,
    Hit,
    Critical,
}

impl HitOutcome {
    pub fn is_hit(self) -> bool {
        !matches!(self, HitOutcome::Miss)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackOutcome {
    pub target: CombatantId,
    pub roll: RollResult,
    pub armor_class: i32,
    pub outcome: HitOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    pub target: CombatantId,
    pub dc: i32,
    pub success: bool,
    /// `None` when the save failed automatically.
    pub roll: Option<RollResult>,
}

/// Everything one ability use did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectOutcome {
    pub actor: CombatantId,
    pub ability: AbilityId,
    /// Cancelled in the declaration window; the cost was still paid.
    pub countered: bool,
    pub targets: Vec<CombatantId>,
    pub attacks: Vec<AttackOutcome>,
    pub saves: Vec<SaveOutcome>,
    pub damage: Vec<DamageReport>,
    pub healed: u32,
    pub statuses: Vec<ApplyOutcome>,
}

impl EffectOutcome {
    fn new(actor: CombatantId, ability: AbilityId) -> Self {
        Self {
            actor,
            ability,
            countered: false,
            targets: Vec::new(),
            attacks: Vec::new(),
            saves: Vec::new(),
            damage: Vec::new(),
            healed: 0,
            statuses: Vec::new(),
        }
    }

    pub fn total_damage(&self) -> u32 {
        self.damage
            .iter()
            .fold(0u32, |total, report| total.saturating_add(report.total()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementOutcome {
    pub combatant: CombatantId,
    pub from: GridPos,
    pub to: GridPos,
    pub steps: usize,
    /// Movement units spent, including standing up.
    pub cost: u32,
    /// Stopped early by a reaction or by dropping.
    pub interrupted: bool,
}

impl CombatContext<'_, '_> {
    /// Runs one ability use through the full pipeline.
    pub(crate) fn execute_ability_in(
        &mut self,
        actor: CombatantId,
        ability: &AbilityId,
        selection: TargetSelection,
        mode: ExecutionMode,
    ) -> Result<EffectOutcome, EngineError> {
        let ValidatedAbility {
            definition,
            targets,
            point,
        } = self.validate(actor, ability, &selection, mode)?;
        tracing::debug!(%actor, %ability, ?mode, targets = targets.len(), "executing ability");

        // Validation passed: from here on state changes.
        let combatant = self.combatant_mut(actor)?;
        if mode == ExecutionMode::Turn {
            combatant
                .budget
                .consume(&definition.cost)
                .map_err(ValidationError::InsufficientResources)?;
        }
        let usage = combatant.usage.entry(definition.id.clone()).or_default();
        match definition.cooldown {
            Cooldown::None => {}
            Cooldown::Turns(turns) => usage.cooldown = turns,
            Cooldown::Charges(_) => usage.charges_used += 1,
        }

        self.emit(EventKind::AbilityDeclared {
            actor,
            ability: definition.id.clone(),
        });
        let mut outcome = EffectOutcome::new(actor, definition.id.clone());
        outcome.targets = targets.clone();

        let declared = self.open_window(
            PendingItem::new(
                TriggerKind::AbilityDeclared,
                PendingEffect::AbilityCast {
                    caster: actor,
                    ability: definition.id.clone(),
                    spell: definition.is_spell(),
                },
            )
            .between(Some(actor), None),
        )?;
        if declared.is_cancelled() {
            self.emit(EventKind::AbilityCountered {
                actor,
                ability: definition.id.clone(),
            });
            outcome.countered = true;
            self.after_ability(actor, definition.is_attack())?;
            return Ok(outcome);
        }

        if definition.concentration {
            self.start_concentration(actor, &definition.id)?;
        }

        for target in targets {
            if !self.state.combatant(target).is_some_and(|c| c.life.is_present()) {
                continue;
            }
            if !self.state.combatant(actor).is_some_and(|c| c.life.is_present()) {
                break;
            }
            self.resolve_sub_hit(actor, target, definition, &mut outcome)?;
        }
        if let Some(point) = point {
            self.apply_point_effects(actor, point, definition)?;
        }

        self.emit(EventKind::AbilityResolved {
            actor,
            ability: definition.id.clone(),
        });
        self.after_ability(actor, definition.is_attack())?;
        Ok(outcome)
    }

    fn after_ability(&mut self, actor: CombatantId, attack: bool) -> Result<(), EngineError> {
        if !self.state.combatant(actor).is_some_and(|c| c.life.is_present()) {
            return Ok(());
        }
        self.fire_removal_event(actor, RemovalEvent::AbilityUsed, Some(actor), &[])?;
        if attack {
            self.fire_removal_event(actor, RemovalEvent::AttackMade, Some(actor), &[])?;
        }
        Ok(())
    }
}
