//! Voluntary movement along a caller-supplied path.

use crate::action::{ActionCost, ValidationError};
use crate::engine::{CombatContext, EngineError};
use crate::event::EventKind;
use crate::reaction::{PendingEffect, PendingItem, TriggerKind};
use crate::state::{CombatantId, GridPos};
use crate::status::{ActionBlock, Condition, RemovalEvent, RemovalReason};

use super::MovementOutcome;

/// A path that passed validation, with its per-step costs.
struct PlannedMove {
    from: GridPos,
    steps: Vec<(GridPos, u32)>,
    stand_up: u32,
}

impl PlannedMove {
    fn total(&self) -> u32 {
        self.stand_up + self.steps.iter().map(|(_, cost)| cost).sum::<u32>()
    }
}

impl CombatContext<'_, '_> {
    /// Moves the current actor along `path`, one opportunity window per step.
    pub(crate) fn execute_movement_in(
        &mut self,
        actor: CombatantId,
        path: &[GridPos],
    ) -> Result<MovementOutcome, EngineError> {
        let plan = self.plan_movement(actor, path)?;
        tracing::debug!(%actor, steps = plan.steps.len(), cost = plan.total(), "moving");

        let mut outcome = MovementOutcome {
            combatant: actor,
            from: plan.from,
            to: plan.from,
            steps: 0,
            cost: 0,
            interrupted: false,
        };

        if plan.stand_up > 0 {
            self.combatant_mut(actor)?
                .budget
                .consume(&ActionCost::movement(plan.stand_up))
                .map_err(ValidationError::InsufficientResources)?;
            outcome.cost += plan.stand_up;
            let definitions = self.definitions()?;
            let prone: Vec<_> = self
                .state
                .statuses_on(actor, definitions)
                .into_iter()
                .filter(|(_, definition)| definition.grants(Condition::Prone))
                .map(|(instance, _)| instance.id)
                .collect();
            for id in prone {
                self.remove_status(id, RemovalReason::ConditionCleared)?;
            }
        }

        for (to, cost) in plan.steps {
            let from = self.combatant(actor)?.position;
            let step = self.open_window(
                PendingItem::new(
                    TriggerKind::MovementLeavesThreatenedArea,
                    PendingEffect::Movement {
                        mover: actor,
                        from,
                        to,
                    },
                )
                .between(Some(actor), Some(actor)),
            )?;

            let stopped = step.is_cancelled()
                || !self.can_act(actor)?
                || self.conditions(actor)?.speed_is_zero();
            if stopped {
                outcome.interrupted = true;
                self.emit(EventKind::MovementInterrupted {
                    combatant: actor,
                    at: from,
                });
                break;
            }

            self.combatant_mut(actor)?
                .budget
                .consume(&ActionCost::movement(cost))
                .map_err(ValidationError::InsufficientResources)?;
            self.combatant_mut(actor)?.position = to;
            outcome.cost += cost;
            outcome.steps += 1;
            outcome.to = to;
            self.enter_surface(actor, to)?;
            if !self.can_act(actor)? {
                outcome.interrupted = true;
                break;
            }
        }

        if outcome.steps > 0 {
            self.emit(EventKind::Moved {
                combatant: actor,
                from: outcome.from,
                to: outcome.to,
                cost: outcome.cost,
            });
            if self.state.combatant(actor).is_some_and(|c| c.life.is_present()) {
                self.fire_removal_event(actor, RemovalEvent::Moved, Some(actor), &[])?;
            }
        }
        Ok(outcome)
    }

    /// Checks the whole path up front and prices every step.
    fn plan_movement(&self, actor: CombatantId, path: &[GridPos]) -> Result<PlannedMove, EngineError> {
        self.check_encounter_active()?;
        let definitions = self.definitions()?;
        let spatial = self.env.spatial()?;
        let record = self
            .state
            .combatant(actor)
            .ok_or(ValidationError::ActorNotFound(actor))?;

        if self.state.current_actor() != Some(actor) {
            return Err(ValidationError::NotActorsTurn {
                actor,
                current: self.state.current_actor(),
            }
            .into());
        }
        if !record.is_alive() {
            return Err(ValidationError::ActorDown(actor).into());
        }
        let conditions = self.conditions(actor)?;
        if conditions.is_incapacitated() {
            return Err(ValidationError::ActorIncapacitated(actor).into());
        }
        if conditions.speed_is_zero() {
            return Err(ValidationError::CannotMove(actor).into());
        }
        if let Some(status) = self
            .state
            .blocking_status(actor, ActionBlock::Movement, definitions)
        {
            return Err(ValidationError::BlockedByStatus {
                status,
                block: ActionBlock::Movement,
            }
            .into());
        }
        let Some(&destination) = path.last() else {
            return Err(ValidationError::EmptyPath.into());
        };

        let from = record.position;
        let mut at = from;
        for &step in path {
            if !at.is_adjacent(step) || step == at || !spatial.is_path_legal(at, &[step]) {
                return Err(ValidationError::IllegalPath(step).into());
            }
            at = step;
        }
        if self
            .state
            .combatant_at(destination)
            .is_some_and(|id| id != actor)
        {
            return Err(ValidationError::IllegalPath(destination).into());
        }

        let tile = self.env.config().tile_size;
        let steps: Vec<(GridPos, u32)> = path
            .iter()
            .map(|&cell| {
                let terrain = spatial.terrain_multiplier(cell);
                let surface = self
                    .state
                    .surfaces
                    .kind_at(cell)
                    .map_or(100, |kind| kind.movement_percent());
                (cell, tile * terrain * surface / 10_000)
            })
            .collect();
        let stand_up = if conditions.has(Condition::Prone) {
            record.stats.speed / 2
        } else {
            0
        };

        let plan = PlannedMove {
            from,
            steps,
            stand_up,
        };
        record
            .budget
            .can_afford(&ActionCost::movement(plan.total()))
            .map_err(ValidationError::InsufficientResources)?;
        Ok(plan)
    }
}
