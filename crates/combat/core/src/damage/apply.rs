//! Applying resolved damage and healing to hit points.

use crate::action::ResourceKind;
use crate::engine::{CombatContext, EngineError};
use crate::event::{ConcentrationEnd, EventKind};
use crate::reaction::{DamageOrigin, PendingEffect, PendingItem, Resolution, TriggerKind};
use crate::state::{CombatantId, DeathSaves, LifeState};
use crate::status::RemovalEvent;

use super::{DamagePacket, DamageType, FinalDamage, resolve_damage};

/// Raw damage on its way to a target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageRequest {
    pub source: Option<CombatantId>,
    pub target: CombatantId,
    pub packet: DamagePacket,
    pub critical: bool,
    pub origin: DamageOrigin,
    pub spell: bool,
}

impl DamageRequest {
    fn into_pending(self) -> PendingEffect {
        PendingEffect::Damage {
            source: self.source,
            target: self.target,
            packet: self.packet,
            critical: self.critical,
            origin: self.origin,
            spell: self.spell,
        }
    }
}

/// What one damage application did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageReport {
    /// Final recipient, which a redirect reaction may have changed.
    pub target: Option<CombatantId>,
    /// A reaction cancelled the damage outright.
    pub negated: bool,
    pub damage: FinalDamage,
    pub absorbed_by_temp: u32,
    pub hp_lost: u32,
    pub downed: bool,
    pub killed: bool,
}

impl DamageReport {
    pub fn total(&self) -> u32 {
        self.damage.total
    }
}

impl CombatContext<'_, '_> {
    /// Opens the damage trigger window, then applies whatever survives it.
    pub fn deal_damage(&mut self, request: DamageRequest) -> Result<DamageReport, EngineError> {
        let target = request.target;
        if !self.state.combatant(target).is_some_and(|c| c.life.is_present()) {
            return Ok(DamageReport::default());
        }
        let item = PendingItem::new(TriggerKind::DamageAboutToApply, request.clone().into_pending())
            .between(request.source, Some(target));
        let resolved = self.open_window(item)?;

        match resolved.resolve(|payload| self.apply_pending_damage(payload)) {
            Resolution::Resolved(report) => report,
            Resolution::Cancelled(item) => {
                let target = item.payload().target().unwrap_or(target);
                tracing::debug!(%target, "damage negated by reaction");
                self.emit(EventKind::DamageNegated {
                    source: request.source,
                    target,
                });
                Ok(DamageReport {
                    target: Some(target),
                    negated: true,
                    ..DamageReport::default()
                })
            }
        }
    }

    fn apply_pending_damage(&mut self, payload: PendingEffect) -> Result<DamageReport, EngineError> {
        match payload {
            PendingEffect::Damage {
                source,
                target,
                packet,
                critical,
                ..
            } => self.apply_damage(source, target, &packet, critical),
            other => Ok(DamageReport {
                target: other.target(),
                ..DamageReport::default()
            }),
        }
    }

    /// Mitigates `packet` and subtracts it from `target`'s hit points.
    pub fn apply_damage(
        &mut self,
        source: Option<CombatantId>,
        target: CombatantId,
        packet: &DamagePacket,
        critical: bool,
    ) -> Result<DamageReport, EngineError> {
        let definitions = self.definitions()?;
        let affinities = self.state.affinities_of(target, definitions);
        let damage = resolve_damage(packet, &affinities);

        let combatant = self.combatant_mut(target)?;
        if !combatant.life.is_present() {
            return Ok(DamageReport::default());
        }
        let (absorbed_by_temp, hp_lost) = combatant.hp.take(damage.total);
        let hp_after = combatant.hp.current;
        let max_hp = combatant.hp.max;
        let life = combatant.life;
        let eligible = combatant.death_save_eligible;

        self.emit(EventKind::DamageDealt {
            source,
            target,
            damage: damage.clone(),
            absorbed_by_temp,
            hp_after,
        });

        let mut report = DamageReport {
            target: Some(target),
            negated: false,
            damage,
            absorbed_by_temp,
            hp_lost,
            downed: false,
            killed: false,
        };
        if report.total() == 0 {
            return Ok(report);
        }

        match life {
            LifeState::Downed(_) | LifeState::Stable => {
                if report.total() >= max_hp {
                    self.kill(target)?;
                    report.killed = true;
                } else {
                    report.killed = self.add_death_save_failures(target, if critical { 2 } else { 1 })?;
                }
            }
            LifeState::Alive if hp_after == 0 => {
                let overflow = report.total() - absorbed_by_temp - hp_lost;
                if overflow >= max_hp || !eligible {
                    self.kill(target)?;
                    report.killed = true;
                } else {
                    self.down(target)?;
                    report.downed = true;
                }
            }
            LifeState::Alive => {
                self.concentration_check(target, report.total())?;
            }
            LifeState::Dead => {}
        }

        let types: Vec<DamageType> = report
            .damage
            .entries
            .iter()
            .filter(|entry| entry.amount > 0)
            .map(|entry| entry.damage_type)
            .collect();
        if self.state.combatant(target).is_some_and(|c| c.life.is_present()) {
            self.fire_removal_event(target, RemovalEvent::DamageTaken, source, &types)?;
        }
        Ok(report)
    }

    /// Restores hit points, reviving a downed combatant. Returns the amount healed.
    pub fn heal(&mut self, target: CombatantId, amount: u32) -> Result<u32, EngineError> {
        let combatant = self.combatant_mut(target)?;
        if !combatant.life.is_present() {
            return Ok(0);
        }
        let restored = combatant.hp.heal(amount);
        let hp_after = combatant.hp.current;
        let revived = restored > 0 && matches!(combatant.life, LifeState::Downed(_) | LifeState::Stable);
        if revived {
            combatant.life = LifeState::Alive;
        }

        self.emit(EventKind::Healed {
            target,
            amount: restored,
            hp_after,
        });
        if revived {
            self.emit(EventKind::CombatantRevived { combatant: target });
        }
        Ok(restored)
    }

    pub fn grant_temp_hp(&mut self, target: CombatantId, amount: u32) -> Result<(), EngineError> {
        let combatant = self.combatant_mut(target)?;
        if combatant.life.is_present() && combatant.hp.grant_temp(amount) {
            self.emit(EventKind::TempHpGranted { target, amount });
        }
        Ok(())
    }

    pub fn restore_resource(
        &mut self,
        target: CombatantId,
        resource: &ResourceKind,
        amount: u32,
    ) -> Result<u32, EngineError> {
        let restored = self.combatant_mut(target)?.budget.restore(resource, amount);
        self.emit(EventKind::ResourceGranted {
            target,
            resource: resource.clone(),
            amount: restored,
        });
        Ok(restored)
    }

    /// Drops a death-save eligible combatant to the Downed state.
    fn down(&mut self, target: CombatantId) -> Result<(), EngineError> {
        self.combatant_mut(target)?.life = LifeState::Downed(DeathSaves::default());
        tracing::debug!(%target, "combatant downed");
        self.emit(EventKind::CombatantDowned { combatant: target });
        self.break_concentration(target, ConcentrationEnd::Down)?;
        Ok(())
    }

    /// Marks `target` dead. The record stays for log replay.
    pub fn kill(&mut self, target: CombatantId) -> Result<(), EngineError> {
        let combatant = self.combatant_mut(target)?;
        if combatant.life.is_dead() {
            return Ok(());
        }
        combatant.life = LifeState::Dead;
        combatant.hp.current = 0;
        combatant.hp.temp = 0;
        tracing::debug!(%target, "combatant died");
        self.emit(EventKind::CombatantDied { combatant: target });
        self.break_concentration(target, ConcentrationEnd::Down)?;
        self.clear_statuses(target)
    }

    /// Adds death-save failures. Returns true if that killed the combatant.
    pub fn add_death_save_failures(&mut self, target: CombatantId, failures: u8) -> Result<bool, EngineError> {
        let limit = self.env.config().death_save_failures;
        let combatant = self.combatant_mut(target)?;
        let mut saves = match combatant.life {
            LifeState::Downed(saves) => saves,
            LifeState::Stable => DeathSaves::default(),
            LifeState::Alive | LifeState::Dead => return Ok(false),
        };
        saves.failures = saves.failures.saturating_add(failures);
        combatant.life = LifeState::Downed(saves);
        if saves.failures >= limit {
            self.kill(target)?;
            return Ok(true);
        }
        Ok(false)
    }
}
