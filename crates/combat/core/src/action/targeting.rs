use crate::state::{CombatantId, GridPos};

/// Geometry of what an ability can pick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetShape {
    SelfOnly,
    #[default]
    Single,
    /// Up to `max_targets` picks; with `allow_repeat` one combatant can take several.
    Multi,
    /// Every matching combatant within `radius` tiles of a chosen point.
    Area { radius: u32 },
}

/// Who an ability may be pointed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetFilter {
    #[default]
    Any,
    Ally,
    Enemy,
    NotSelf,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetRule {
    pub shape: TargetShape,
    /// Reach in tiles, measured from the actor.
    pub range: u32,
    pub filter: TargetFilter,
    pub max_targets: u32,
    pub requires_los: bool,
    pub allow_repeat: bool,
}

impl Default for TargetRule {
    fn default() -> Self {
        Self {
            shape: TargetShape::Single,
            range: 1,
            filter: TargetFilter::Any,
            max_targets: 1,
            requires_los: true,
            allow_repeat: false,
        }
    }
}

impl TargetRule {
    pub fn self_only() -> Self {
        Self {
            shape: TargetShape::SelfOnly,
            range: 0,
            requires_los: false,
            ..Self::default()
        }
    }

    pub fn single(range: u32, filter: TargetFilter) -> Self {
        Self {
            range,
            filter,
            ..Self::default()
        }
    }

    pub fn area(range: u32, radius: u32) -> Self {
        Self {
            shape: TargetShape::Area { radius },
            range,
            ..Self::default()
        }
    }
}

/// Caller's choice of targets for one ability use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSelection {
    #[default]
    None,
    Combatants(Vec<CombatantId>),
    Point(GridPos),
}

impl TargetSelection {
    pub fn single(target: CombatantId) -> Self {
        Self::Combatants(vec![target])
    }
}
