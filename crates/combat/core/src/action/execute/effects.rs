//! Per-target resolution and the ordered effect list.

use crate::action::{
    AbilityDefinition, EffectCondition, EffectKind, ForceDirection, SaveSpec, TargetShape,
};
use crate::damage::{DamagePacket, DamageRequest};
use crate::engine::{CombatContext, EngineError};
use crate::event::EventKind;
use crate::reaction::DamageOrigin;
use crate::state::{Ability, CombatantId, GridPos};
use crate::status::{RemovalReason, StatusApplication};
use crate::surface::SurfaceSpawn;

use super::{EffectOutcome, HitOutcome, SaveOutcome};

/// Result of the roll that gates a sub-hit's effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gate {
    None,
    Attack(HitOutcome),
    Save { success: bool, half: bool },
}

impl Gate {
    fn allows(self, when: EffectCondition) -> bool {
        match (when, self) {
            (EffectCondition::Always, _) => true,
            (EffectCondition::OnHit, Gate::Attack(hit)) => hit.is_hit(),
            (EffectCondition::OnMiss, Gate::Attack(hit)) => !hit.is_hit(),
            (EffectCondition::OnCritical, Gate::Attack(hit)) => hit == HitOutcome::Critical,
            (EffectCondition::OnFailedSave, Gate::Save { success, .. }) => !success,
            (EffectCondition::OnSuccessfulSave, Gate::Save { success, .. }) => success,
            _ => false,
        }
    }

    fn critical(self) -> bool {
        self == Gate::Attack(HitOutcome::Critical)
    }
}

impl CombatContext<'_, '_> {
    /// One target's own roll, then every effect in declared order.
    pub(super) fn resolve_sub_hit(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        definition: &AbilityDefinition,
        outcome: &mut EffectOutcome,
    ) -> Result<(), EngineError> {
        let gate = if let Some(spec) = &definition.attack {
            let attack = self.attack_roll(actor, target, definition, spec)?;
            let hit = attack.outcome;
            outcome.attacks.push(attack);
            Gate::Attack(hit)
        } else if let Some(SaveSpec {
            ability,
            dc,
            half_on_success,
        }) = definition.save
        {
            let dc = self.save_dc(actor, dc)?;
            let (success, roll) = self.roll_save(target, ability, dc, Some(actor))?;
            outcome.saves.push(SaveOutcome {
                target,
                dc,
                success,
                roll,
            });
            Gate::Save {
                success,
                half: half_on_success,
            }
        } else {
            Gate::None
        };

        let linked = definition.concentration.then_some(actor);
        let mut packet = DamagePacket::new();

        for effect in &definition.effects {
            if !gate.allows(effect.when) {
                continue;
            }
            if let EffectKind::Damage {
                dice,
                damage_type,
                add_ability_modifier,
            } = &effect.kind
            {
                let dice = if gate.critical() { dice.doubled() } else { *dice };
                let mut amount = self.roll_dice(&dice)?.total;
                if *add_ability_modifier {
                    amount += self.damage_modifier(actor, definition)?;
                }
                let amount = amount.max(0).unsigned_abs();
                let amount = match gate {
                    Gate::Save {
                        success: true,
                        half: true,
                    } if effect.when == EffectCondition::Always => amount / 2,
                    Gate::Save {
                        success: true,
                        half: false,
                    } if effect.when == EffectCondition::Always => continue,
                    _ => amount,
                };
                packet.add(*damage_type, amount);
                continue;
            }

            // Consecutive damage effects land as one packet.
            self.flush_damage(actor, target, definition, gate, &mut packet, outcome)?;
            if !self.state.combatant(target).is_some_and(|c| c.life.is_present()) {
                return Ok(());
            }

            match &effect.kind {
                EffectKind::Damage { .. } => {}
                EffectKind::Heal {
                    dice,
                    add_ability_modifier,
                } => {
                    let mut amount = self.roll_dice(dice)?.total;
                    if *add_ability_modifier {
                        let caster = self.combatant(actor)?;
                        amount += caster.modifier(caster.spellcasting.unwrap_or(Ability::Wisdom));
                    }
                    outcome.healed += self.heal(target, amount.max(0).unsigned_abs())?;
                }
                EffectKind::TemporaryHp { dice } => {
                    let amount = self.roll_amount(dice)?;
                    self.grant_temp_hp(target, amount)?;
                }
                EffectKind::ApplyStatus { status, duration } => {
                    let applied = self.apply_status(
                        StatusApplication::new(status.clone(), target)
                            .from_source(Some(actor))
                            .for_turns(*duration)
                            .linked_to(linked),
                    )?;
                    outcome.statuses.push(applied);
                }
                EffectKind::RemoveStatus { status } => {
                    self.remove_status_named(target, status, RemovalReason::Dispelled)?;
                }
                EffectKind::ForcedMove {
                    distance,
                    direction,
                } => {
                    self.forced_move(actor, target, *distance, *direction)?;
                }
                // Area abilities place their surface once, at the aim point.
                EffectKind::SpawnSurface { .. }
                    if matches!(definition.targeting.shape, TargetShape::Area { .. }) => {}
                EffectKind::SpawnSurface {
                    surface,
                    radius,
                    lifetime,
                } => {
                    let center = self.combatant(target)?.position;
                    self.spawn_surface(SurfaceSpawn {
                        center,
                        kind: *surface,
                        radius: *radius,
                        lifetime: *lifetime,
                        owner: Some(actor),
                        concentration: definition.concentration,
                    })?;
                }
                EffectKind::GrantResource { resource, amount } => {
                    self.restore_resource(target, resource, *amount)?;
                }
            }
        }
        self.flush_damage(actor, target, definition, gate, &mut packet, outcome)
    }

    fn flush_damage(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        definition: &AbilityDefinition,
        gate: Gate,
        packet: &mut DamagePacket,
        outcome: &mut EffectOutcome,
    ) -> Result<(), EngineError> {
        if packet.0.is_empty() {
            return Ok(());
        }
        let mut packet = std::mem::take(packet);
        let bonus = self.hook_damage_bonus(actor, target, definition)?;
        let first = packet.types().next();
        if bonus != 0
            && let Some(first) = first
        {
            let entry = packet.0.entry(first).or_default();
            *entry = entry.saturating_add_signed(bonus);
        }
        let origin = if definition.is_attack() {
            DamageOrigin::Attack(definition.id.clone())
        } else {
            DamageOrigin::Ability(definition.id.clone())
        };
        let report = self.deal_damage(DamageRequest {
            source: Some(actor),
            target,
            packet,
            critical: gate.critical(),
            origin,
            spell: definition.is_spell(),
        })?;
        outcome.damage.push(report);
        Ok(())
    }

    /// Ability modifier added to weapon damage (or spell damage with a casting stat).
    fn damage_modifier(&self, actor: CombatantId, definition: &AbilityDefinition) -> Result<i32, EngineError> {
        let caster = self.combatant(actor)?;
        let ability = match (&definition.attack, caster.spellcasting) {
            (Some(spec), _) => spec.ability,
            (None, Some(casting)) => casting,
            (None, None) => Ability::Strength,
        };
        Ok(caster.modifier(ability))
    }

    /// Surfaces and elemental reactions centred on an area ability's aim point.
    pub(super) fn apply_point_effects(
        &mut self,
        actor: CombatantId,
        point: GridPos,
        definition: &AbilityDefinition,
    ) -> Result<(), EngineError> {
        let area_radius = match definition.targeting.shape {
            TargetShape::Area { radius } => radius,
            _ => 0,
        };
        for effect in &definition.effects {
            if effect.when != EffectCondition::Always {
                continue;
            }
            match &effect.kind {
                EffectKind::Damage { damage_type, .. } => {
                    self.react_surfaces(point, area_radius, *damage_type);
                }
                EffectKind::SpawnSurface {
                    surface,
                    radius,
                    lifetime,
                } => {
                    self.spawn_surface(SurfaceSpawn {
                        center: point,
                        kind: *surface,
                        radius: *radius,
                        lifetime: *lifetime,
                        owner: Some(actor),
                        concentration: definition.concentration,
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Pushes or pulls `target` up to `distance` tiles. Never provokes.
    fn forced_move(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        distance: u32,
        direction: ForceDirection,
    ) -> Result<(), EngineError> {
        let spatial = self.env.spatial()?;
        let origin = self.combatant(actor)?.position;
        let start = self.combatant(target)?.position;
        let mut current = start;

        for _ in 0..distance {
            let next = match direction {
                ForceDirection::Away => current.step_away_from(origin),
                ForceDirection::Toward => current.step_toward(origin),
            };
            let blocked = next == current
                || next == origin
                || !spatial.is_path_legal(current, &[next])
                || self.state.combatant_at(next).is_some_and(|id| id != target);
            if blocked {
                break;
            }
            self.combatant_mut(target)?.position = next;
            current = next;
            self.enter_surface(target, next)?;
            if !self.state.combatant(target).is_some_and(|c| c.life.is_present()) {
                break;
            }
        }

        if current != start {
            self.emit(EventKind::ForcedMoved {
                combatant: target,
                from: start,
                to: current,
            });
        }
        Ok(())
    }
}
