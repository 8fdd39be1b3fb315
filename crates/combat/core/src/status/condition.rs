//! Canonical conditions and the pure rules derived from them.
//!
//! Roll code never looks at status ids. It asks which conditions a combatant
//! carries and feeds the answer through the functions below.

use crate::state::Ability;

/// The closed set of canonical conditions.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

bitflags::bitflags! {
    /// Set of conditions currently affecting one combatant.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ConditionSet: u16 {
        const BLINDED = 1 << 0;
        const CHARMED = 1 << 1;
        const DEAFENED = 1 << 2;
        const FRIGHTENED = 1 << 3;
        const GRAPPLED = 1 << 4;
        const INCAPACITATED = 1 << 5;
        const INVISIBLE = 1 << 6;
        const PARALYZED = 1 << 7;
        const PETRIFIED = 1 << 8;
        const POISONED = 1 << 9;
        const PRONE = 1 << 10;
        const RESTRAINED = 1 << 11;
        const STUNNED = 1 << 12;
        const UNCONSCIOUS = 1 << 13;
    }
}

impl Condition {
    pub const fn flag(self) -> ConditionSet {
        match self {
            Condition::Blinded => ConditionSet::BLINDED,
            Condition::Charmed => ConditionSet::CHARMED,
            Condition::Deafened => ConditionSet::DEAFENED,
            Condition::Frightened => ConditionSet::FRIGHTENED,
            Condition::Grappled => ConditionSet::GRAPPLED,
            Condition::Incapacitated => ConditionSet::INCAPACITATED,
            Condition::Invisible => ConditionSet::INVISIBLE,
            Condition::Paralyzed => ConditionSet::PARALYZED,
            Condition::Petrified => ConditionSet::PETRIFIED,
            Condition::Poisoned => ConditionSet::POISONED,
            Condition::Prone => ConditionSet::PRONE,
            Condition::Restrained => ConditionSet::RESTRAINED,
            Condition::Stunned => ConditionSet::STUNNED,
            Condition::Unconscious => ConditionSet::UNCONSCIOUS,
        }
    }
}

/// Melee or ranged, as far as conditions care.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttackRange {
    Melee,
    Ranged,
}

/// Condition-derived inputs to one attack roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackConditions {
    pub advantage: u32,
    pub disadvantage: u32,
    pub auto_crit: bool,
}

/// Condition-derived inputs to one saving throw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveConditions {
    pub auto_fail: bool,
    pub disadvantage: u32,
}

const HELPLESS: ConditionSet = ConditionSet::PARALYZED
    .union(ConditionSet::PETRIFIED)
    .union(ConditionSet::STUNNED)
    .union(ConditionSet::UNCONSCIOUS);

impl ConditionSet {
    pub fn has(self, condition: Condition) -> bool {
        self.contains(condition.flag())
    }

    pub fn with(self, condition: Condition) -> Self {
        self | condition.flag()
    }

    pub fn list(self) -> Vec<Condition> {
        use strum::IntoEnumIterator;
        Condition::iter().filter(|c| self.has(*c)).collect()
    }

    /// No actions, bonus actions, reactions, or concentration.
    pub fn is_incapacitated(self) -> bool {
        self.intersects(ConditionSet::INCAPACITATED | HELPLESS)
    }

    pub fn speed_is_zero(self) -> bool {
        self.intersects(ConditionSet::GRAPPLED | ConditionSet::RESTRAINED | HELPLESS)
    }

    /// Petrified creatures resist every damage type.
    pub fn resists_all_damage(self) -> bool {
        self.contains(ConditionSet::PETRIFIED)
    }

    pub fn has_check_disadvantage(self) -> bool {
        self.intersects(ConditionSet::POISONED | ConditionSet::FRIGHTENED)
    }

    /// `melee` means the attacker is within reach of the target.
    pub fn attack_effects(attacker: Self, target: Self, range: AttackRange, melee: bool) -> AttackConditions {
        let mut out = AttackConditions::default();

        if attacker.has(Condition::Invisible) {
            out.advantage += 1;
        }
        for condition in [
            Condition::Blinded,
            Condition::Frightened,
            Condition::Poisoned,
            Condition::Prone,
            Condition::Restrained,
        ] {
            if attacker.has(condition) {
                out.disadvantage += 1;
            }
        }

        if target.has(Condition::Blinded) {
            out.advantage += 1;
        }
        if target.has(Condition::Invisible) {
            out.disadvantage += 1;
        }
        if target.intersects(HELPLESS | ConditionSet::RESTRAINED) {
            out.advantage += 1;
        }
        if target.has(Condition::Prone) {
            match (range, melee) {
                (AttackRange::Melee, _) | (AttackRange::Ranged, true) => out.advantage += 1,
                (AttackRange::Ranged, false) => out.disadvantage += 1,
            }
        }

        out.auto_crit = melee
            && (target.has(Condition::Paralyzed) || target.has(Condition::Unconscious));
        out
    }

    pub fn saving_throw_effects(self, ability: Ability) -> SaveConditions {
        let physical = matches!(ability, Ability::Strength | Ability::Dexterity);
        SaveConditions {
            auto_fail: physical && self.intersects(HELPLESS),
            disadvantage: u32::from(
                ability == Ability::Dexterity && self.has(Condition::Restrained),
            ),
        }
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<T: IntoIterator<Item = Condition>>(iter: T) -> Self {
        iter.into_iter()
            .fold(ConditionSet::empty(), |set, condition| set.with(condition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prone_target_depends_on_distance() {
        let prone = ConditionSet::PRONE;
        let melee = ConditionSet::attack_effects(
            ConditionSet::empty(),
            prone,
            AttackRange::Melee,
            true,
        );
        assert_eq!((melee.advantage, melee.disadvantage), (1, 0));

        let far = ConditionSet::attack_effects(
            ConditionSet::empty(),
            prone,
            AttackRange::Ranged,
            false,
        );
        assert_eq!((far.advantage, far.disadvantage), (0, 1));
    }

    #[test]
    fn paralyzed_target_is_auto_crit_only_in_melee() {
        let target = ConditionSet::PARALYZED;
        assert!(
            ConditionSet::attack_effects(ConditionSet::empty(), target, AttackRange::Melee, true)
                .auto_crit
        );
        assert!(
            !ConditionSet::attack_effects(
                ConditionSet::empty(),
                target,
                AttackRange::Ranged,
                false
            )
            .auto_crit
        );
    }

    #[test]
    fn helpless_creatures_fail_physical_saves() {
        let stunned: ConditionSet = [Condition::Stunned].into_iter().collect();
        assert!(stunned.saving_throw_effects(Ability::Dexterity).auto_fail);
        assert!(!stunned.saving_throw_effects(Ability::Wisdom).auto_fail);
        assert!(stunned.is_incapacitated());
        assert!(stunned.speed_is_zero());

        let restrained = ConditionSet::RESTRAINED;
        let save = restrained.saving_throw_effects(Ability::Dexterity);
        assert!(!save.auto_fail);
        assert_eq!(save.disadvantage, 1);
    }

    #[test]
    fn list_round_trips_through_flags() {
        let set: ConditionSet = [Condition::Poisoned, Condition::Prone].into_iter().collect();
        assert_eq!(set.list(), vec![Condition::Poisoned, Condition::Prone]);
        assert!(set.has_check_disadvantage());
    }
}
