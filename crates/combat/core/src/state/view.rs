use crate::action::ActionBudget;
use crate::env::DefinitionOracle;
use crate::state::{
    AbilityId, CombatState, CombatantId, Faction, GridPos, HitPoints, LifeState, StatusId,
    StatusInstanceId,
};
use crate::status::{Condition, StatusDuration};

/// Read-only view of one status on a combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusView {
    pub instance: StatusInstanceId,
    pub status: StatusId,
    pub source: Option<CombatantId>,
    pub stacks: u8,
    pub remaining: StatusDuration,
}

/// Read-only copy of a combatant, with derived values resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    pub faction: Faction,
    pub hp: HitPoints,
    pub life: LifeState,
    pub position: GridPos,
    pub armor_class: i32,
    pub budget: ActionBudget,
    pub statuses: Vec<StatusView>,
    pub conditions: Vec<Condition>,
    pub concentration: Option<AbilityId>,
}

impl CombatantSnapshot {
    /// Captures `id` with armor class and conditions resolved against `definitions`.
    pub fn capture(
        state: &CombatState,
        id: CombatantId,
        definitions: &dyn DefinitionOracle,
    ) -> Option<Self> {
        let combatant = state.combatant(id)?;
        let statuses = state
            .statuses
            .on(id)
            .map(|instance| StatusView {
                instance: instance.id,
                status: instance.status.clone(),
                source: instance.source,
                stacks: instance.stacks,
                remaining: instance.remaining,
            })
            .collect();
        Some(Self {
            id,
            name: combatant.name.clone(),
            faction: combatant.faction,
            hp: combatant.hp,
            life: combatant.life,
            position: combatant.position,
            armor_class: state.armor_class_of(id, definitions),
            budget: combatant.budget.clone(),
            statuses,
            conditions: state.conditions_of(id, definitions).list(),
            concentration: combatant.concentration.as_ref().map(|slot| slot.ability.clone()),
        })
    }
}
