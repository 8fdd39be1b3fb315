//! Mutable encounter state.
//!
//! [`CombatState`] owns every combatant, status instance, surface cell, and
//! the dice counter. Definitions are never stored here; derived values that
//! depend on them take a [`DefinitionOracle`] reference.

mod combatant;
mod common;
#[cfg(feature = "serde")]
mod snapshot;
mod view;

use std::collections::BTreeMap;

pub use combatant::{
    AbilityUsage, Combatant, CombatantTemplate, ConcentrationSlot, DeathSaves, DerivedStats,
    HitPoints, LifeState,
};
pub use common::{
    Ability, AbilityId, AbilityScores, CombatantId, Faction, GridPos, ReactionId,
    StatusId, StatusInstanceId, TemplateId,
};
#[cfg(feature = "serde")]
pub use snapshot::{EncounterSnapshot, SnapshotError};
pub use view::{CombatantSnapshot, StatusView};

use crate::damage::{AffinityKind, DamageAffinity};
use crate::env::DefinitionOracle;
use crate::roll::DiceState;
use crate::status::{
    ActionBlock, Condition, ConditionSet, StatusDefinition, StatusFlag, StatusInstance,
    StatusRegistry,
};
use crate::surface::SurfaceGrid;
use crate::turn::TurnQueue;

/// Why an encounter stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    /// Only one side still has conscious combatants.
    Victory,
    /// Nobody left standing on any side.
    MutualDefeat,
    /// The round limit ran out.
    RoundLimit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncounterPhase {
    #[default]
    NotStarted,
    Active,
    Ended {
        winner: Option<Faction>,
        reason: EndReason,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub combatants: BTreeMap<CombatantId, Combatant>,
    pub statuses: StatusRegistry,
    pub surfaces: SurfaceGrid,
    pub turn: TurnQueue,
    pub dice: DiceState,
    pub phase: EncounterPhase,
    /// Sequence number of the next published event.
    pub event_seq: u64,
}

impl CombatState {
    pub fn new(seed: u64) -> Self {
        Self {
            dice: DiceState::new(seed),
            ..Self::default()
        }
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub fn round(&self) -> u32 {
        self.turn.round
    }

    pub fn current_actor(&self) -> Option<CombatantId> {
        self.turn.current()
    }

    pub fn is_active(&self) -> bool {
        self.phase == EncounterPhase::Active
    }

    /// Initiative order, followed by anyone missing from it (by id).
    pub fn initiative_order(&self) -> Vec<CombatantId> {
        let mut order = self.turn.order.clone();
        order.extend(self.combatants.keys().filter(|id| !self.turn.order.contains(id)));
        order
    }

    /// Live status instances on `id` paired with their definitions.
    ///
    /// Instances whose definition is missing are skipped.
    pub fn statuses_on<'s, 'd>(
        &'s self,
        id: CombatantId,
        definitions: &'d dyn DefinitionOracle,
    ) -> Vec<(&'s StatusInstance, &'d StatusDefinition)> {
        self.statuses
            .on(id)
            .filter_map(|instance| {
                definitions
                    .status(&instance.status)
                    .map(|definition| (instance, definition))
            })
            .collect()
    }

    pub fn conditions_of(&self, id: CombatantId, definitions: &dyn DefinitionOracle) -> ConditionSet {
        let mut set: ConditionSet = self
            .statuses_on(id, definitions)
            .into_iter()
            .flat_map(|(_, definition)| definition.conditions.iter().copied())
            .collect();
        if let Some(combatant) = self.combatant(id)
            && matches!(combatant.life, LifeState::Downed(_) | LifeState::Stable)
        {
            set = set.with(Condition::Unconscious).with(Condition::Prone);
        }
        set
    }

    /// Innate affinities, status affinities, and condition-granted resistance.
    pub fn affinities_of(
        &self,
        id: CombatantId,
        definitions: &dyn DefinitionOracle,
    ) -> Vec<DamageAffinity> {
        let mut affinities = self
            .combatant(id)
            .map(|c| c.affinities.clone())
            .unwrap_or_default();
        for (_, definition) in self.statuses_on(id, definitions) {
            affinities.extend(definition.affinities.iter().copied());
        }
        if self.conditions_of(id, definitions).resists_all_damage() {
            affinities.push(DamageAffinity::all(AffinityKind::Resistant));
        }
        affinities
    }

    pub fn armor_class_of(&self, id: CombatantId, definitions: &dyn DefinitionOracle) -> i32 {
        let base = self.combatant(id).map_or(10, |c| c.stats.armor_class);
        base + self
            .statuses_on(id, definitions)
            .iter()
            .map(|(_, definition)| definition.ac_bonus)
            .sum::<i32>()
    }

    /// Innate immunities plus those granted by statuses.
    pub fn immunities_of(&self, id: CombatantId, definitions: &dyn DefinitionOracle) -> Vec<String> {
        let mut immunities = self
            .combatant(id)
            .map(|c| c.status_immunities.clone())
            .unwrap_or_default();
        for (_, definition) in self.statuses_on(id, definitions) {
            immunities.extend(definition.grants_immunity.iter().cloned());
        }
        immunities
    }

    pub fn has_flag(
        &self,
        id: CombatantId,
        flag: StatusFlag,
        definitions: &dyn DefinitionOracle,
    ) -> bool {
        self.statuses_on(id, definitions)
            .iter()
            .any(|(_, definition)| definition.has_flag(flag))
    }

    /// First status on `id` that imposes `block`.
    pub fn blocking_status(
        &self,
        id: CombatantId,
        block: ActionBlock,
        definitions: &dyn DefinitionOracle,
    ) -> Option<StatusId> {
        self.statuses_on(id, definitions)
            .into_iter()
            .find(|(_, definition)| definition.blocks.contains(&block))
            .map(|(instance, _)| instance.status.clone())
    }

    /// Sources of every Charmed status on `id`.
    pub fn charmed_by(&self, id: CombatantId, definitions: &dyn DefinitionOracle) -> Vec<CombatantId> {
        self.statuses_on(id, definitions)
            .into_iter()
            .filter(|(_, definition)| definition.grants(Condition::Charmed))
            .filter_map(|(instance, _)| instance.source)
            .collect()
    }

    pub fn combatant_at(&self, pos: GridPos) -> Option<CombatantId> {
        self.combatants
            .values()
            .find(|c| c.position == pos && c.life.is_present())
            .map(|c| c.id)
    }
}
