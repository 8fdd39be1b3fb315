//! Pure validation of an ability use. Nothing here touches state.

use std::collections::BTreeSet;

use crate::action::{
    AbilityDefinition, Cooldown, TargetFilter, TargetSelection, TargetShape, ValidationError,
};
use crate::engine::{CombatContext, EngineError};
use crate::state::{AbilityId, CombatantId, EncounterPhase, GridPos};
use crate::status::ActionBlock;

use super::ExecutionMode;

/// An ability use that passed validation, with its targets resolved.
#[derive(Clone, Debug)]
pub(crate) struct ValidatedAbility<'e> {
    pub definition: &'e AbilityDefinition,
    pub targets: Vec<CombatantId>,
    /// Aim point of an area ability.
    pub point: Option<GridPos>,
}

impl<'e> CombatContext<'_, 'e> {
    pub(crate) fn check_encounter_active(&self) -> Result<(), ValidationError> {
        match self.state.phase {
            EncounterPhase::Active => Ok(()),
            EncounterPhase::NotStarted => Err(ValidationError::EncounterNotActive),
            EncounterPhase::Ended { .. } => Err(ValidationError::EncounterOver),
        }
    }

    pub(crate) fn validate(
        &self,
        actor: CombatantId,
        ability: &AbilityId,
        selection: &TargetSelection,
        mode: ExecutionMode,
    ) -> Result<ValidatedAbility<'e>, EngineError> {
        self.check_encounter_active()?;
        let definitions = self.definitions()?;
        let record = self
            .state
            .combatant(actor)
            .ok_or(ValidationError::ActorNotFound(actor))?;

        if mode == ExecutionMode::Turn && self.state.current_actor() != Some(actor) {
            return Err(ValidationError::NotActorsTurn {
                actor,
                current: self.state.current_actor(),
            }
            .into());
        }
        if !record.is_alive() {
            return Err(ValidationError::ActorDown(actor).into());
        }
        if self.conditions(actor)?.is_incapacitated() {
            return Err(ValidationError::ActorIncapacitated(actor).into());
        }

        let definition = definitions
            .ability(ability)
            .ok_or_else(|| ValidationError::UnknownAbility(ability.clone()))?;
        if !record.knows(ability) {
            return Err(ValidationError::AbilityNotKnown {
                actor,
                ability: ability.clone(),
            }
            .into());
        }

        self.check_blocks(actor, definition)?;

        let usage = record.usage.get(ability).copied().unwrap_or_default();
        if usage.cooldown > 0 {
            return Err(ValidationError::OnCooldown {
                ability: ability.clone(),
                turns: usage.cooldown,
            }
            .into());
        }
        if let Cooldown::Charges(max) = definition.cooldown
            && usage.charges_used >= max
        {
            return Err(ValidationError::NoCharges(ability.clone()).into());
        }

        if mode == ExecutionMode::Turn {
            record
                .budget
                .can_afford(&definition.cost)
                .map_err(ValidationError::InsufficientResources)?;
        }

        let (targets, point) = self.resolve_targets(actor, definition, selection)?;
        Ok(ValidatedAbility {
            definition,
            targets,
            point,
        })
    }

    fn check_blocks(&self, actor: CombatantId, definition: &AbilityDefinition) -> Result<(), EngineError> {
        let definitions = self.definitions()?;
        let mut blocks: Vec<ActionBlock> = definition
            .components
            .iter()
            .map(|component| ActionBlock::Component(*component))
            .collect();
        if definition.is_spell() {
            blocks.push(ActionBlock::Spells);
        }
        if definition.is_attack() {
            blocks.push(ActionBlock::Attacks);
        }
        if definition.cost.bonus_action > 0 {
            blocks.push(ActionBlock::BonusActions);
        }
        for block in blocks {
            if let Some(status) = self.state.blocking_status(actor, block, definitions) {
                return Err(ValidationError::BlockedByStatus { status, block }.into());
            }
        }
        Ok(())
    }

    fn resolve_targets(
        &self,
        actor: CombatantId,
        definition: &AbilityDefinition,
        selection: &TargetSelection,
    ) -> Result<(Vec<CombatantId>, Option<GridPos>), EngineError> {
        let rule = &definition.targeting;
        match rule.shape {
            TargetShape::SelfOnly => match selection {
                TargetSelection::None => Ok((vec![actor], None)),
                TargetSelection::Combatants(ids) if ids.as_slice() == [actor] => {
                    Ok((vec![actor], None))
                }
                _ => Err(ValidationError::WrongSelection.into()),
            },
            TargetShape::Single | TargetShape::Multi => {
                let TargetSelection::Combatants(ids) = selection else {
                    return Err(ValidationError::WrongSelection.into());
                };
                let max = match rule.shape {
                    TargetShape::Single => 1,
                    _ => rule.max_targets.max(1),
                };
                if ids.is_empty() || ids.len() > max as usize {
                    return Err(ValidationError::InvalidTargetCount { max, got: ids.len() }.into());
                }
                if !rule.allow_repeat {
                    let unique: BTreeSet<_> = ids.iter().collect();
                    if unique.len() != ids.len() {
                        return Err(ValidationError::InvalidTarget {
                            target: ids[0],
                            reason: "target listed more than once",
                        }
                        .into());
                    }
                }
                for target in ids {
                    self.check_target(actor, *target, definition)?;
                }
                Ok((ids.clone(), None))
            }
            TargetShape::Area { radius } => {
                let TargetSelection::Point(point) = selection else {
                    return Err(ValidationError::WrongSelection.into());
                };
                let origin = self.combatant(actor)?.position;
                let distance = origin.distance(*point);
                if distance > rule.range {
                    return Err(ValidationError::PointOutOfRange {
                        point: *point,
                        distance,
                        range: rule.range,
                    }
                    .into());
                }
                if rule.requires_los && !self.env.spatial()?.has_line_of_sight(origin, *point) {
                    return Err(ValidationError::NoLineOfSightToPoint(*point).into());
                }

                let definitions = self.definitions()?;
                let charmers = if definition.is_harmful() {
                    self.state.charmed_by(actor, definitions)
                } else {
                    Vec::new()
                };
                let targets = self
                    .state
                    .initiative_order()
                    .into_iter()
                    .filter(|id| {
                        self.state.combatant(*id).is_some_and(|c| {
                            c.life.is_present() && c.position.distance(*point) <= radius
                        })
                    })
                    .filter(|id| self.passes_filter(actor, *id, rule.filter))
                    .filter(|id| !charmers.contains(id))
                    .collect();
                Ok((targets, Some(*point)))
            }
        }
    }

    fn check_target(
        &self,
        actor: CombatantId,
        target: CombatantId,
        definition: &AbilityDefinition,
    ) -> Result<(), EngineError> {
        let rule = &definition.targeting;
        let actor_pos = self.combatant(actor)?.position;
        let record = self
            .state
            .combatant(target)
            .ok_or(ValidationError::TargetNotFound(target))?;
        if !record.life.is_present() {
            return Err(ValidationError::InvalidTarget {
                target,
                reason: "target is dead",
            }
            .into());
        }
        if !self.passes_filter(actor, target, rule.filter) {
            return Err(ValidationError::InvalidTarget {
                target,
                reason: "target does not match the ability's filter",
            }
            .into());
        }

        let distance = actor_pos.distance(record.position);
        if distance > rule.range {
            return Err(ValidationError::OutOfRange {
                target,
                distance,
                range: rule.range,
            }
            .into());
        }
        if rule.requires_los
            && target != actor
            && !self.env.spatial()?.has_line_of_sight(actor_pos, record.position)
        {
            return Err(ValidationError::NoLineOfSight(target).into());
        }

        if definition.is_harmful()
            && self
                .state
                .charmed_by(actor, self.definitions()?)
                .contains(&target)
        {
            return Err(ValidationError::Charmed { actor, target }.into());
        }
        Ok(())
    }

    fn passes_filter(&self, actor: CombatantId, target: CombatantId, filter: TargetFilter) -> bool {
        let (Some(a), Some(t)) = (self.state.combatant(actor), self.state.combatant(target)) else {
            return false;
        };
        match filter {
            TargetFilter::Any => true,
            TargetFilter::Ally => actor == target || a.faction.is_allied_with(t.faction),
            TargetFilter::Enemy => a.faction.is_hostile_to(t.faction),
            TargetFilter::NotSelf => actor != target,
        }
    }
}
