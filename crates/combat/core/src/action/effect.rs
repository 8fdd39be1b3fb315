use crate::roll::DiceExpr;
use crate::damage::DamageType;
use crate::state::StatusId;
use crate::surface::SurfaceKind;

use super::ResourceKind;

/// Roll outcome an effect is gated on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectCondition {
    #[default]
    Always,
    OnHit,
    OnMiss,
    OnCritical,
    OnFailedSave,
    OnSuccessfulSave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForceDirection {
    Away,
    Toward,
}

/// Closed set of effect kinds. Each has exactly one handler in the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    Damage {
        dice: DiceExpr,
        damage_type: DamageType,
        #[cfg_attr(feature = "serde", serde(default))]
        add_ability_modifier: bool,
    },
    Heal {
        dice: DiceExpr,
        #[cfg_attr(feature = "serde", serde(default))]
        add_ability_modifier: bool,
    },
    TemporaryHp {
        dice: DiceExpr,
    },
    ApplyStatus {
        status: StatusId,
        /// Overrides the definition's turn count.
        #[cfg_attr(feature = "serde", serde(default))]
        duration: Option<u32>,
    },
    RemoveStatus {
        status: StatusId,
    },
    ForcedMove {
        distance: u32,
        direction: ForceDirection,
    },
    SpawnSurface {
        surface: SurfaceKind,
        #[cfg_attr(feature = "serde", serde(default))]
        radius: u32,
        /// Rounds; `None` lasts until removed.
        #[cfg_attr(feature = "serde", serde(default))]
        lifetime: Option<u32>,
    },
    GrantResource {
        resource: ResourceKind,
        amount: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub kind: EffectKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub when: EffectCondition,
}

impl Effect {
    pub fn always(kind: EffectKind) -> Self {
        Self {
            kind,
            when: EffectCondition::Always,
        }
    }

    pub fn when(kind: EffectKind, when: EffectCondition) -> Self {
        Self { kind, when }
    }

    pub fn is_damage(&self) -> bool {
        matches!(self.kind, EffectKind::Damage { .. })
    }
}
