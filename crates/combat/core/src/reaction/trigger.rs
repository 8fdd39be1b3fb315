use crate::damage::DamagePacket;
use crate::state::{AbilityId, CombatantId, GridPos, ReactionId};

/// Moments that open a reaction window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerKind {
    DamageAboutToApply,
    MovementLeavesThreatenedArea,
    AbilityDeclared,
    TurnStart,
    TurnEnd,
}

/// Where pending damage came from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageOrigin {
    /// An attack roll hit.
    Attack(AbilityId),
    /// A save-based or automatic ability effect.
    Ability(AbilityId),
    Status,
    Surface,
}

/// Payload of a pending resolution item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingEffect {
    Damage {
        source: Option<CombatantId>,
        target: CombatantId,
        packet: DamagePacket,
        critical: bool,
        origin: DamageOrigin,
        spell: bool,
    },
    /// One step of voluntary movement.
    Movement {
        mover: CombatantId,
        from: GridPos,
        to: GridPos,
    },
    AbilityCast {
        caster: CombatantId,
        ability: AbilityId,
        spell: bool,
    },
    TurnBoundary {
        combatant: CombatantId,
    },
}

impl PendingEffect {
    pub fn source(&self) -> Option<CombatantId> {
        match self {
            PendingEffect::Damage { source, .. } => *source,
            PendingEffect::Movement { mover, .. } => Some(*mover),
            PendingEffect::AbilityCast { caster, .. } => Some(*caster),
            PendingEffect::TurnBoundary { combatant } => Some(*combatant),
        }
    }

    pub fn target(&self) -> Option<CombatantId> {
        match self {
            PendingEffect::Damage { target, .. } => Some(*target),
            PendingEffect::Movement { mover, .. } => Some(*mover),
            PendingEffect::AbilityCast { .. } => None,
            PendingEffect::TurnBoundary { combatant } => Some(*combatant),
        }
    }

    pub fn is_attack(&self) -> bool {
        matches!(
            self,
            PendingEffect::Damage {
                origin: DamageOrigin::Attack(_),
                ..
            }
        )
    }

    pub fn is_spell(&self) -> bool {
        match self {
            PendingEffect::Damage { spell, .. } | PendingEffect::AbilityCast { spell, .. } => {
                *spell
            }
            PendingEffect::Movement { .. } | PendingEffect::TurnBoundary { .. } => false,
        }
    }
}

/// Question put to a [`DecisionSource`](crate::env::DecisionSource).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactionOffer {
    pub reactor: CombatantId,
    pub reaction: ReactionId,
    pub trigger: TriggerKind,
    pub source: Option<CombatantId>,
    pub target: Option<CombatantId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionDecision {
    Use,
    Decline,
}
