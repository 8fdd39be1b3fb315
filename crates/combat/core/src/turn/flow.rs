//! Encounter start, turn boundaries, round boundaries, and the end check.

use std::collections::BTreeSet;

use crate::action::ValidationError;
use crate::engine::{CombatContext, EngineError};
use crate::event::EventKind;
use crate::reaction::{PendingEffect, PendingItem, TriggerKind};
use crate::roll::{Modifier, RollCheck};
use crate::state::{
    Ability, Combatant, CombatantId, EncounterPhase, EndReason, Faction, LifeState,
};
use crate::status::{RemovalEvent, StatusApplication, TickPhase};

use super::{InitiativeEntry, InitiativeOrder, TurnQueue, sort_initiative};

impl CombatContext<'_, '_> {
    // ========================================================================
    // Encounter start
    // ========================================================================

    pub(crate) fn begin_encounter_in(
        &mut self,
        combatants: Vec<Combatant>,
        order: InitiativeOrder,
    ) -> Result<(), EngineError> {
        if self.state.phase != EncounterPhase::NotStarted {
            return Err(EngineError::EncounterAlreadyStarted);
        }
        if combatants.is_empty() {
            return Err(EngineError::NoCombatants);
        }
        let mut seen = BTreeSet::new();
        for combatant in &combatants {
            if !seen.insert(combatant.id) {
                return Err(EngineError::DuplicateCombatant(combatant.id));
            }
        }
        if let InitiativeOrder::Explicit(ids) = &order {
            let listed: BTreeSet<_> = ids.iter().copied().collect();
            if listed.len() != ids.len() || listed != seen {
                return Err(EngineError::InvalidInitiative(
                    "explicit order must list every combatant exactly once".into(),
                ));
            }
        }

        for mut combatant in combatants {
            combatant.budget.set_movement_max(combatant.stats.speed);
            self.state.combatants.insert(combatant.id, combatant);
        }

        let (turn_order, scores) = match order {
            InitiativeOrder::Explicit(ids) => {
                let scores = ids
                    .iter()
                    .map(|id| {
                        let score = self.state.combatant(*id).and_then(|c| c.initiative).unwrap_or(0);
                        (*id, score)
                    })
                    .collect::<Vec<_>>();
                (ids, scores)
            }
            InitiativeOrder::Rolled => self.roll_initiative()?,
        };

        tracing::info!(combatants = turn_order.len(), "encounter started");
        self.state.turn = TurnQueue::new(turn_order.clone());
        self.state.phase = EncounterPhase::Active;
        self.emit(EventKind::EncounterStarted {
            order: turn_order.clone(),
        });
        for (combatant, score) in scores {
            self.emit(EventKind::InitiativeRolled { combatant, score });
        }
        if let Ok(definitions) = self.definitions() {
            for warning in definitions.warnings() {
                self.warn_data(warning.clone());
            }
        }

        for id in &turn_order {
            let passives = self.combatant(*id)?.passives.clone();
            for status in passives {
                self.apply_status(StatusApplication::new(status, *id).from_source(Some(*id)))?;
            }
        }

        self.emit(EventKind::RoundStarted { round: 1 });
        let eligible = self.turn_eligible();
        if let Some(first) = self.state.turn.reset_to_first(|id| eligible.contains(&id)) {
            self.start_turn(first)?;
        }
        self.check_encounter_end();
        Ok(())
    }

    /// d20 + DEX for everyone without a preset score, sorted highest first.
    fn roll_initiative(&mut self) -> Result<(Vec<CombatantId>, Vec<(CombatantId, i32)>), EngineError> {
        let ids: Vec<_> = self.state.combatants.keys().copied().collect();
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let record = self.combatant(id)?;
            let preset = record.initiative;
            let dexterity = record.scores.dexterity;
            let modifier = record.modifier(Ability::Dexterity);
            let tiebreaker = record.initiative_tiebreaker;
            let score = match preset {
                Some(score) => score,
                None => {
                    let check = RollCheck::d20().with_modifier(Modifier::ability("DEX", modifier));
                    self.roll_check(check)?.total
                }
            };
            self.combatant_mut(id)?.initiative = Some(score);
            entries.push(InitiativeEntry {
                id,
                score,
                tiebreaker,
                dexterity,
            });
        }
        sort_initiative(&mut entries);
        let order = entries.iter().map(|entry| entry.id).collect();
        let scores = entries.iter().map(|entry| (entry.id, entry.score)).collect();
        Ok((order, scores))
    }

    // ========================================================================
    // Turn boundaries
    // ========================================================================

    /// Everything that happens as `combatant` begins its turn.
    pub(crate) fn start_turn(&mut self, combatant: CombatantId) -> Result<(), EngineError> {
        let record = self.combatant_mut(combatant)?;
        // Dropping during this turn's hazards does not cost a save until next turn.
        let downed_at_start = matches!(record.life, LifeState::Downed(_));
        let speed = record.stats.speed;
        record.budget.reset_for_turn();
        record.budget.set_movement_max(speed);
        for usage in record.usage.values_mut() {
            usage.cooldown = usage.cooldown.saturating_sub(1);
        }
        tracing::debug!(%combatant, round = self.state.round(), "turn started");
        self.emit(EventKind::TurnStarted { combatant });

        self.open_window(
            PendingItem::new(TriggerKind::TurnStart, PendingEffect::TurnBoundary { combatant })
                .between(Some(combatant), Some(combatant)),
        )?;
        if self.present(combatant) {
            self.fire_removal_event(combatant, RemovalEvent::TurnStarted, None, &[])?;
        }
        if self.present(combatant) {
            self.surface_turn_start(combatant)?;
        }
        if self.present(combatant) {
            self.tick_statuses(combatant, TickPhase::TurnStart)?;
        }
        if self.conditions(combatant)?.speed_is_zero() {
            self.combatant_mut(combatant)?.budget.clear_movement();
        }
        if downed_at_start && matches!(self.combatant(combatant)?.life, LifeState::Downed(_)) {
            self.death_save(combatant)?;
        }
        Ok(())
    }

    fn death_save(&mut self, combatant: CombatantId) -> Result<(), EngineError> {
        let config = self.env.config();
        let roll = self.roll_check(RollCheck::d20())?;
        let LifeState::Downed(mut saves) = self.combatant(combatant)?.life else {
            return Ok(());
        };

        if roll.is_natural_max() {
            self.emit(EventKind::DeathSaveRolled {
                combatant,
                natural: roll.natural,
                successes: saves.successes,
                failures: saves.failures,
            });
            self.heal(combatant, 1)?;
            return Ok(());
        }

        if roll.is_natural_one() {
            saves.failures = saves.failures.saturating_add(2);
        } else if roll.total >= 10 {
            saves.successes = saves.successes.saturating_add(1);
        } else {
            saves.failures = saves.failures.saturating_add(1);
        }
        self.emit(EventKind::DeathSaveRolled {
            combatant,
            natural: roll.natural,
            successes: saves.successes,
            failures: saves.failures,
        });

        if saves.failures >= config.death_save_failures {
            self.kill(combatant)?;
        } else if saves.successes >= config.death_save_successes {
            self.combatant_mut(combatant)?.life = LifeState::Stable;
            self.emit(EventKind::CombatantStabilized { combatant });
        } else {
            self.combatant_mut(combatant)?.life = LifeState::Downed(saves);
        }
        Ok(())
    }

    pub(crate) fn end_turn_in(&mut self, actor: CombatantId) -> Result<(), EngineError> {
        self.check_encounter_active()?;
        if self.state.combatant(actor).is_none() {
            return Err(ValidationError::ActorNotFound(actor).into());
        }
        if self.state.current_actor() != Some(actor) {
            return Err(ValidationError::NotActorsTurn {
                actor,
                current: self.state.current_actor(),
            }
            .into());
        }

        if self.present(actor) {
            self.tick_statuses(actor, TickPhase::TurnEnd)?;
        }
        self.open_window(
            PendingItem::new(TriggerKind::TurnEnd, PendingEffect::TurnBoundary { combatant: actor })
                .between(Some(actor), Some(actor)),
        )?;
        if self.present(actor) {
            self.fire_removal_event(actor, RemovalEvent::TurnEnded, None, &[])?;
        }
        self.emit(EventKind::TurnEnded { combatant: actor });
        tracing::debug!(%actor, "turn ended");

        self.check_encounter_end();
        if !self.state.is_active() {
            return Ok(());
        }
        self.advance_turn()
    }

    /// Moves the queue to the next combatant, crossing a round boundary when needed.
    fn advance_turn(&mut self) -> Result<(), EngineError> {
        let eligible = self.turn_eligible();
        let Some((next, wrapped)) = self.state.turn.advance(|id| eligible.contains(&id)) else {
            self.finish(None, EndReason::MutualDefeat);
            return Ok(());
        };
        if wrapped {
            self.end_round()?;
            if !self.state.is_active() {
                return Ok(());
            }
        }
        self.start_turn(next)?;
        self.check_encounter_end();
        Ok(())
    }

    fn end_round(&mut self) -> Result<(), EngineError> {
        for id in self.state.initiative_order() {
            if self.present(id) {
                self.tick_statuses(id, TickPhase::RoundEnd)?;
            }
        }
        self.expire_surfaces();
        self.check_encounter_end();
        if !self.state.is_active() {
            return Ok(());
        }

        let round = self.state.turn.round + 1;
        if round > self.env.config().max_rounds {
            self.finish(None, EndReason::RoundLimit);
            return Ok(());
        }
        self.state.turn.round = round;
        for combatant in self.state.combatants.values_mut() {
            combatant.budget.reset_for_round();
        }
        tracing::debug!(round, "round started");
        self.emit(EventKind::RoundStarted { round });
        Ok(())
    }

    // ========================================================================
    // Encounter end
    // ========================================================================

    /// Ends the encounter once at most one side has anyone conscious.
    pub(crate) fn check_encounter_end(&mut self) {
        if !self.state.is_active() {
            return;
        }
        let sides: BTreeSet<Faction> = self
            .state
            .combatants
            .values()
            .filter(|c| c.is_alive() && c.faction != Faction::Neutral)
            .map(|c| match c.faction {
                Faction::Ally => Faction::Player,
                other => other,
            })
            .collect();
        match sides.len() {
            0 => self.finish(None, EndReason::MutualDefeat),
            1 => {
                let winner = sides.into_iter().next();
                self.finish(winner, EndReason::Victory);
            }
            _ => {}
        }
    }

    fn finish(&mut self, winner: Option<Faction>, reason: EndReason) {
        tracing::info!(?winner, ?reason, round = self.state.round(), "encounter ended");
        self.state.phase = EncounterPhase::Ended { winner, reason };
        self.emit(EventKind::EncounterEnded { winner, reason });
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Combatants that still take turns: conscious ones and those rolling death saves.
    fn turn_eligible(&self) -> BTreeSet<CombatantId> {
        self.state
            .combatants
            .values()
            .filter(|c| matches!(c.life, LifeState::Alive | LifeState::Downed(_)))
            .map(|c| c.id)
            .collect()
    }

    fn present(&self, id: CombatantId) -> bool {
        self.state.combatant(id).is_some_and(|c| c.life.is_present())
    }
}
