//! One sustained effect per caster.
//!
//! The slot only records which ability is being held. Dependent statuses point
//! back through `linked_caster`, dependent surfaces through their owner and
//! concentration flag, so breaking concentration is two id lookups.

use crate::engine::{CombatContext, EngineError};
use crate::event::{ConcentrationEnd, EventKind};
use crate::state::{Ability, AbilityId, CombatantId, ConcentrationSlot};
use crate::status::RemovalReason;

impl CombatContext<'_, '_> {
    /// Ends any prior concentration of `caster`, then starts holding `ability`.
    pub fn start_concentration(&mut self, caster: CombatantId, ability: &AbilityId) -> Result<(), EngineError> {
        self.break_concentration(caster, ConcentrationEnd::Replaced)?;
        let round = self.state.round();
        self.combatant_mut(caster)?.concentration = Some(ConcentrationSlot {
            ability: ability.clone(),
            started_round: round,
        });
        self.emit(EventKind::ConcentrationStarted {
            caster,
            ability: ability.clone(),
        });
        Ok(())
    }

    /// Drops the slot and everything it sustains. No-op when not concentrating.
    pub fn break_concentration(
        &mut self,
        caster: CombatantId,
        reason: ConcentrationEnd,
    ) -> Result<(), EngineError> {
        let Some(slot) = self
            .state
            .combatant_mut(caster)
            .and_then(|c| c.concentration.take())
        else {
            return Ok(());
        };
        tracing::debug!(%caster, ability = %slot.ability, ?reason, "concentration broken");
        self.emit(EventKind::ConcentrationBroken {
            caster,
            ability: slot.ability,
            reason,
        });

        for instance in self.state.statuses.linked_to(caster) {
            self.remove_status(instance, RemovalReason::Concentration)?;
        }
        for (position, cell) in self.state.surfaces.remove_concentration_of(caster) {
            self.emit(EventKind::SurfaceRemoved {
                position,
                surface: cell.surface,
            });
        }
        Ok(())
    }

    /// CON save against `max(min_dc, damage / 2)`; failure breaks concentration.
    pub fn concentration_check(&mut self, caster: CombatantId, damage: u32) -> Result<(), EngineError> {
        let concentrating = self
            .state
            .combatant(caster)
            .is_some_and(|c| c.concentration.is_some() && c.is_alive());
        if !concentrating || damage == 0 {
            return Ok(());
        }
        let dc = (damage / 2).max(self.env.config().concentration_min_dc);
        let dc = i32::try_from(dc).unwrap_or(i32::MAX);
        if !self.saving_throw(caster, Ability::Constitution, dc, None)? {
            self.break_concentration(caster, ConcentrationEnd::FailedSave)?;
        }
        Ok(())
    }
}
