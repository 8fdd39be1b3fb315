//! Synchronous abstraction for sourcing a combatant's turn.
//!
//! The runner asks a [`TurnPlanner`] for a plan at the start of every turn and
//! feeds the commands to the engine in order, so encounters can be driven by
//! the autopilot, scripted fixtures, or nothing at all.
use combat_core::{AbilityId, CombatState, CombatantId, GridPos, TargetSelection};

/// One engine command the planner wants executed for the acting combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnCommand {
    UseAbility {
        ability: AbilityId,
        targets: TargetSelection,
    },
    Move {
        path: Vec<GridPos>,
    },
}

impl TurnCommand {
    pub fn ability(ability: AbilityId, targets: TargetSelection) -> Self {
        Self::UseAbility { ability, targets }
    }
}

/// Trait for planning a whole turn from the current encounter state.
///
/// Commands are executed in order; one that fails validation is skipped and
/// the rest of the plan still runs. The turn always ends after the plan.
pub trait TurnPlanner {
    fn plan_turn(&self, actor: CombatantId, state: &CombatState) -> Vec<TurnCommand>;
}

/// Plans nothing, so every turn ends immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassPlanner;

impl TurnPlanner for PassPlanner {
    fn plan_turn(&self, _actor: CombatantId, _state: &CombatState) -> Vec<TurnCommand> {
        Vec::new()
    }
}
