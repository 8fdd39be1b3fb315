//! Status application, ticking, and removal.
//!
//! Every removal goes through [`CombatContext::remove_status`], which runs
//! `on_remove` functors exactly once, then deletes the instance and emits the
//! event.

use crate::damage::{DamagePacket, DamageRequest, DamageType};
use crate::engine::{CombatContext, EngineError};
use crate::event::{ConcentrationEnd, EventKind};
use crate::reaction::DamageOrigin;
use crate::state::{CombatantId, StatusId, StatusInstanceId};

use super::{
    ApplyPlan, RemovalEvent, RemovalPredicate, RemovalReason, StatusDuration, StatusFunctor,
    TickPhase,
};

/// Request to put a status on a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusApplication {
    pub status: StatusId,
    pub target: CombatantId,
    pub source: Option<CombatantId>,
    /// Overrides the definition's duration with `Turns(n)`.
    pub duration: Option<u32>,
    /// Caster whose concentration sustains the instance.
    pub linked_caster: Option<CombatantId>,
}

impl StatusApplication {
    pub fn new(status: StatusId, target: CombatantId) -> Self {
        Self {
            status,
            target,
            source: None,
            duration: None,
            linked_caster: None,
        }
    }

    pub fn from_source(mut self, source: Option<CombatantId>) -> Self {
        self.source = source;
        self
    }

    pub fn for_turns(mut self, turns: Option<u32>) -> Self {
        self.duration = turns;
        self
    }

    pub fn linked_to(mut self, caster: Option<CombatantId>) -> Self {
        self.linked_caster = caster;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied(StatusInstanceId),
    /// Existing instance had its duration reset.
    Refreshed(StatusInstanceId),
    Stacked { instance: StatusInstanceId, stacks: u8 },
    /// The target is immune.
    Blocked,
    /// No definition exists for the id.
    Unknown,
    /// The target is dead or missing.
    TargetGone,
}

/// Snapshot of the instance a functor list runs for.
#[derive(Clone, Debug)]
struct FunctorScope {
    instance: StatusInstanceId,
    status: StatusId,
    source: Option<CombatantId>,
    target: CombatantId,
    stacks: u8,
}

impl CombatContext<'_, '_> {
    pub fn apply_status(&mut self, request: StatusApplication) -> Result<ApplyOutcome, EngineError> {
        let definitions = self.definitions()?;
        let Some(definition) = definitions.status(&request.status) else {
            self.warn_data(format!("status '{}' is not defined", request.status));
            return Ok(ApplyOutcome::Unknown);
        };
        let target = request.target;
        if !self.state.combatant(target).is_some_and(|c| c.life.is_present()) {
            return Ok(ApplyOutcome::TargetGone);
        }

        let immunities = self.state.immunities_of(target, definitions);
        if definition.is_blocked_by(&immunities) {
            tracing::debug!(status = %definition.id, %target, "status blocked by immunity");
            self.emit(EventKind::StatusBlocked {
                status: definition.id.clone(),
                target,
            });
            return Ok(ApplyOutcome::Blocked);
        }

        let duration = request
            .duration
            .map_or(definition.duration, StatusDuration::Turns);
        let round = self.state.round();

        let (outcome, instance, stacks, refreshed) =
            match self.state.statuses.plan(definition, target) {
                ApplyPlan::Create => {
                    let id = self.state.statuses.insert(
                        definition,
                        request.source,
                        target,
                        duration,
                        request.linked_caster,
                        round,
                    );
                    (ApplyOutcome::Applied(id), id, 1, false)
                }
                ApplyPlan::Refresh(id) | ApplyPlan::AtMaxStacks(id) => {
                    let stacks = self
                        .state
                        .statuses
                        .refresh(id, duration, request.source, request.linked_caster, false)
                        .unwrap_or(1);
                    (ApplyOutcome::Refreshed(id), id, stacks, true)
                }
                ApplyPlan::AddStack(id) => {
                    let stacks = self
                        .state
                        .statuses
                        .refresh(id, duration, request.source, request.linked_caster, true)
                        .unwrap_or(1);
                    (ApplyOutcome::Stacked { instance: id, stacks }, id, stacks, true)
                }
            };

        self.emit(EventKind::StatusApplied {
            instance,
            status: definition.id.clone(),
            target,
            source: request.source,
            stacks,
            refreshed,
        });

        if !refreshed {
            let scope = FunctorScope {
                instance,
                status: definition.id.clone(),
                source: request.source,
                target,
                stacks,
            };
            self.run_functors(&scope, &definition.on_apply)?;
        }

        if !definition.grants_immunity.is_empty() {
            self.purge_immune_statuses(target)?;
        }
        if !definition.conditions.is_empty() {
            self.check_incapacitation(target)?;
        }
        Ok(outcome)
    }

    /// Removes one instance. Returns false if it was already gone.
    ///
    /// Functors run while the instance is still registered. A functor that
    /// removes the instance it belongs to is a no-op.
    pub fn remove_status(
        &mut self,
        instance: StatusInstanceId,
        reason: RemovalReason,
    ) -> Result<bool, EngineError> {
        let definitions = self.definitions()?;
        let Some(current) = self.state.statuses.get(instance) else {
            return Ok(false);
        };
        if self.removing.contains(&instance) {
            return Ok(false);
        }
        let scope = FunctorScope {
            instance,
            status: current.status.clone(),
            source: current.source,
            target: current.target,
            stacks: current.stacks,
        };

        // A removed owner is no longer present, so its functors find nothing to act on.
        if let Some(definition) = definitions.status(&scope.status) {
            self.removing.insert(instance);
            let ran = self.run_functors(&scope, &definition.on_remove);
            self.removing.remove(&instance);
            ran?;
        }

        let Some(removed) = self.state.statuses.take(instance) else {
            return Ok(false);
        };
        tracing::debug!(status = %removed.status, target = %removed.target, %reason, "status removed");
        self.emit(EventKind::StatusRemoved {
            instance,
            status: removed.status,
            target: removed.target,
            reason,
        });
        Ok(true)
    }

    /// Removes every instance of `status` on `target`.
    pub fn remove_status_named(
        &mut self,
        target: CombatantId,
        status: &StatusId,
        reason: RemovalReason,
    ) -> Result<usize, EngineError> {
        let ids: Vec<_> = self
            .state
            .statuses
            .on(target)
            .filter(|i| &i.status == status)
            .map(|i| i.id)
            .collect();
        let mut removed = 0;
        for id in ids {
            if self.remove_status(id, reason)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Drops every status on `target` once it has left the fight.
    pub fn clear_statuses(&mut self, target: CombatantId) -> Result<(), EngineError> {
        for id in self.state.statuses.ids_on(target) {
            self.remove_status(id, RemovalReason::OwnerRemoved)?;
        }
        Ok(())
    }

    /// Runs the `phase` tick for every status on `combatant`.
    pub fn tick_statuses(&mut self, combatant: CombatantId, phase: TickPhase) -> Result<(), EngineError> {
        let definitions = self.definitions()?;
        for id in self.state.statuses.ids_on(combatant) {
            let Some(instance) = self.state.statuses.get(id) else {
                continue;
            };
            let Some(definition) = definitions.status(&instance.status) else {
                continue;
            };
            if definition.tick_phase != phase {
                continue;
            }
            let scope = FunctorScope {
                instance: id,
                status: instance.status.clone(),
                source: instance.source,
                target: instance.target,
                stacks: instance.stacks,
            };

            self.emit(EventKind::StatusTicked {
                instance: id,
                status: scope.status.clone(),
                target: combatant,
            });
            self.run_functors(&scope, &definition.on_tick)?;

            if !self.state.combatant(combatant).is_some_and(|c| c.life.is_present()) {
                return Ok(());
            }
            let expired = self
                .state
                .statuses
                .get_mut(id)
                .is_some_and(|instance| instance.tick_duration());
            if expired {
                self.remove_status(id, RemovalReason::Expired)?;
            }
        }
        Ok(())
    }

    /// Removes statuses on `subject` keyed to `event`.
    pub fn fire_removal_event(
        &mut self,
        subject: CombatantId,
        event: RemovalEvent,
        cause: Option<CombatantId>,
        damage_types: &[DamageType],
    ) -> Result<(), EngineError> {
        let definitions = self.definitions()?;
        let matching: Vec<StatusInstanceId> = self
            .state
            .statuses_on(subject, definitions)
            .into_iter()
            .filter(|(instance, definition)| {
                definition.remove_on.iter().any(|trigger| {
                    trigger.event == event
                        && match trigger.predicate {
                            RemovalPredicate::Any => true,
                            RemovalPredicate::FromSource => {
                                cause.is_some() && cause == instance.source
                            }
                            RemovalPredicate::DamageType(damage_type) => {
                                damage_types.contains(&damage_type)
                            }
                        }
                })
            })
            .map(|(instance, _)| instance.id)
            .collect();

        for id in matching {
            self.remove_status(id, RemovalReason::UntilEvent)?;
        }
        Ok(())
    }

    /// Removes statuses the target became immune to after the fact.
    fn purge_immune_statuses(&mut self, target: CombatantId) -> Result<(), EngineError> {
        let definitions = self.definitions()?;
        let immunities = self.state.immunities_of(target, definitions);
        let purged: Vec<StatusInstanceId> = self
            .state
            .statuses_on(target, definitions)
            .into_iter()
            .filter(|(_, definition)| definition.is_blocked_by(&immunities))
            .map(|(instance, _)| instance.id)
            .collect();
        for id in purged {
            self.remove_status(id, RemovalReason::Immunity)?;
        }
        Ok(())
    }

    /// Incapacitated casters cannot hold concentration.
    fn check_incapacitation(&mut self, target: CombatantId) -> Result<(), EngineError> {
        let holding = self
            .state
            .combatant(target)
            .is_some_and(|c| c.concentration.is_some());
        if holding && self.conditions(target)?.is_incapacitated() {
            self.break_concentration(target, ConcentrationEnd::Incapacitated)?;
        }
        Ok(())
    }

    fn run_functors(&mut self, scope: &FunctorScope, functors: &[StatusFunctor]) -> Result<(), EngineError> {
        for functor in functors {
            if !self
                .state
                .combatant(scope.target)
                .is_some_and(|c| c.life.is_present())
            {
                break;
            }
            match functor {
                StatusFunctor::Damage {
                    dice,
                    damage_type,
                    per_stack,
                } => {
                    let mut amount = self.roll_amount(dice)?;
                    if *per_stack {
                        amount = amount.saturating_mul(u32::from(scope.stacks));
                    }
                    self.deal_damage(DamageRequest {
                        source: scope.source,
                        target: scope.target,
                        packet: DamagePacket::single(*damage_type, amount),
                        critical: false,
                        origin: DamageOrigin::Status,
                        spell: false,
                    })?;
                }
                StatusFunctor::Heal { dice } => {
                    let amount = self.roll_amount(dice)?;
                    self.heal(scope.target, amount)?;
                }
                StatusFunctor::TemporaryHp { dice } => {
                    let amount = self.roll_amount(dice)?;
                    self.grant_temp_hp(scope.target, amount)?;
                }
                StatusFunctor::SavingThrow {
                    ability,
                    dc,
                    ends_on_success,
                } => {
                    let dc = i32::try_from(*dc).unwrap_or(i32::MAX);
                    let saved = self.saving_throw(scope.target, *ability, dc, scope.source)?;
                    if saved && *ends_on_success {
                        self.remove_status(scope.instance, RemovalReason::SavedAgainst)?;
                        break;
                    }
                }
                StatusFunctor::ApplyStatus { status, duration } => {
                    self.apply_status(
                        StatusApplication::new(status.clone(), scope.target)
                            .from_source(scope.source)
                            .for_turns(*duration),
                    )?;
                }
                StatusFunctor::RemoveStatus { status } => {
                    self.remove_status_named(scope.target, status, RemovalReason::Dispelled)?;
                }
                StatusFunctor::RestoreResource { resource, amount } => {
                    self.restore_resource(scope.target, resource, *amount)?;
                }
            }
        }
        Ok(())
    }
}
