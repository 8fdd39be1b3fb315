use crate::state::{CombatantId, StatusId, StatusInstanceId};

use super::StatusDuration;

/// One live status on one combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusInstance {
    pub id: StatusInstanceId,
    pub status: StatusId,
    pub source: Option<CombatantId>,
    pub target: CombatantId,
    pub remaining: StatusDuration,
    pub stacks: u8,
    /// Caster whose concentration keeps this instance alive.
    pub linked_caster: Option<CombatantId>,
    pub applied_round: u32,
}

impl StatusInstance {
    /// Decrements a turn-based duration. Returns true once it has run out.
    pub fn tick_duration(&mut self) -> bool {
        match &mut self.remaining {
            StatusDuration::Turns(turns) => {
                *turns = turns.saturating_sub(1);
                *turns == 0
            }
            StatusDuration::UntilEvent | StatusDuration::Permanent => false,
        }
    }
}

/// Why an instance left the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalReason {
    Expired,
    /// A keyed removal trigger fired.
    UntilEvent,
    /// The carrier gained an immunity covering this status.
    Immunity,
    /// The carrier left combat (died without death saves).
    OwnerRemoved,
    /// The linked caster lost concentration.
    Concentration,
    /// Removed by an ability or functor.
    Dispelled,
    /// A condition it granted was cleared (standing up from prone).
    ConditionCleared,
    /// The carrier made the save the status offers.
    SavedAgainst,
}
