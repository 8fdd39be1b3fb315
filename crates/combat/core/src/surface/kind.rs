//! Surface kinds and their transformation lattice.

use crate::damage::DamageType;
use crate::roll::DiceExpr;
use crate::state::Ability;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceKind {
    Fire,
    Water,
    Ice,
    Grease,
    Acid,
    Poison,
    Steam,
    ElectrifiedWater,
    Web,
}

/// A save a combatant must make when entering (or starting a turn on) a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSave {
    pub ability: Ability,
    pub dc: u32,
    /// Status applied on a failed save.
    pub status: &'static str,
}

impl SurfaceKind {
    /// Damage dealt on entry and at the start of each turn spent inside.
    pub fn hazard(self) -> Option<(DiceExpr, DamageType)> {
        let d4 = DiceExpr::new(1, 4, 0);
        match self {
            SurfaceKind::Fire => Some((d4, DamageType::Fire)),
            SurfaceKind::Acid => Some((d4, DamageType::Acid)),
            SurfaceKind::Poison => Some((d4, DamageType::Poison)),
            SurfaceKind::ElectrifiedWater => Some((d4, DamageType::Lightning)),
            SurfaceKind::Water
            | SurfaceKind::Ice
            | SurfaceKind::Grease
            | SurfaceKind::Steam
            | SurfaceKind::Web => None,
        }
    }

    pub fn entry_save(self) -> Option<SurfaceSave> {
        match self {
            SurfaceKind::Ice | SurfaceKind::Grease => Some(SurfaceSave {
                ability: Ability::Dexterity,
                dc: 10,
                status: "prone",
            }),
            SurfaceKind::Web => Some(SurfaceSave {
                ability: Ability::Dexterity,
                dc: 12,
                status: "restrained",
            }),
            _ => None,
        }
    }

    /// Movement cost multiplier in percent.
    pub fn movement_percent(self) -> u32 {
        match self {
            SurfaceKind::Ice | SurfaceKind::Grease | SurfaceKind::Web => 200,
            _ => 100,
        }
    }

    /// Result of `incoming` landing on a cell that already holds `self`.
    pub fn combine(self, incoming: SurfaceKind) -> SurfaceKind {
        use SurfaceKind::*;
        match (self, incoming) {
            (Water, Fire) | (Fire, Water) => Steam,
            (Ice, Fire) => Water,
            (Grease, Fire) | (Web, Fire) => Fire,
            (Water, Ice) => Ice,
            (Water, ElectrifiedWater) => ElectrifiedWater,
            (Fire, Grease) | (Fire, Web) => Fire,
            (_, incoming) => incoming,
        }
    }

    /// Result of damage of `damage_type` hitting a cell holding `self`, if it changes.
    pub fn react_to(self, damage_type: DamageType) -> Option<SurfaceKind> {
        use SurfaceKind::*;
        match (self, damage_type) {
            (Water, DamageType::Fire) => Some(Steam),
            (Ice, DamageType::Fire) => Some(Water),
            (Grease, DamageType::Fire) | (Web, DamageType::Fire) => Some(Fire),
            (Water, DamageType::Cold) => Some(Ice),
            (Water, DamageType::Lightning) | (Steam, DamageType::Lightning) => {
                Some(ElectrifiedWater)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_matches_element_rules() {
        assert_eq!(SurfaceKind::Water.combine(SurfaceKind::Fire), SurfaceKind::Steam);
        assert_eq!(SurfaceKind::Ice.combine(SurfaceKind::Fire), SurfaceKind::Water);
        assert_eq!(SurfaceKind::Grease.combine(SurfaceKind::Fire), SurfaceKind::Fire);
        assert_eq!(SurfaceKind::Web.combine(SurfaceKind::Fire), SurfaceKind::Fire);
        assert_eq!(SurfaceKind::Water.combine(SurfaceKind::Ice), SurfaceKind::Ice);
        assert_eq!(SurfaceKind::Acid.combine(SurfaceKind::Water), SurfaceKind::Water);
    }

    #[test]
    fn damage_transforms_cells() {
        assert_eq!(
            SurfaceKind::Water.react_to(DamageType::Cold),
            Some(SurfaceKind::Ice)
        );
        assert_eq!(
            SurfaceKind::Water.react_to(DamageType::Lightning),
            Some(SurfaceKind::ElectrifiedWater)
        );
        assert_eq!(SurfaceKind::Acid.react_to(DamageType::Fire), None);
    }
}
