//! Identifiers and small value types shared by every combat module.

use std::fmt;

/// Unique identifier for a combatant within one encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of one live status instance (never reused within an encounter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatusInstanceId(pub u64);

impl fmt::Display for StatusInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status#{}", self.0)
    }
}

macro_rules! definition_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

definition_id!(
    /// Key of an [`AbilityDefinition`](crate::action::AbilityDefinition).
    AbilityId
);
definition_id!(
    /// Key of a [`StatusDefinition`](crate::status::StatusDefinition).
    StatusId
);
definition_id!(
    /// Key of a [`ReactionDefinition`](crate::reaction::ReactionDefinition).
    ReactionId
);
definition_id!(
    /// Key of a [`CombatantTemplate`](crate::state::CombatantTemplate).
    TemplateId
);

/// Grid cell coordinate. Distances are Chebyshev (a diagonal step costs one tile).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chessboard distance in tiles.
    pub fn distance(self, other: GridPos) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// True when `other` is one king-move away (or the same cell).
    pub fn is_adjacent(self, other: GridPos) -> bool {
        self.distance(other) <= 1
    }

    /// One step from `self` toward `target` (no-op when already there).
    pub fn step_toward(self, target: GridPos) -> GridPos {
        GridPos::new(
            self.x + (target.x - self.x).signum(),
            self.y + (target.y - self.y).signum(),
        )
    }

    /// One step from `self` directly away from `origin`.
    ///
    /// When both cells coincide there is no direction; the cell itself is returned.
    pub fn step_away_from(self, origin: GridPos) -> GridPos {
        GridPos::new(
            self.x + (self.x - origin.x).signum(),
            self.y + (self.y - origin.y).signum(),
        )
    }

    /// All cells within `radius` tiles (inclusive), in row-major order.
    pub fn cells_within(self, radius: u32) -> impl Iterator<Item = GridPos> {
        let r = radius as i32;
        let center = self;
        (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| GridPos::new(center.x + dx, center.y + dy)))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Side a combatant fights for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Faction {
    Player,
    Ally,
    Neutral,
    Hostile,
}

impl Faction {
    /// Players and allies fight together; neutrals are nobody's enemy.
    pub fn is_hostile_to(self, other: Faction) -> bool {
        match (self, other) {
            (Faction::Hostile, Faction::Player | Faction::Ally) => true,
            (Faction::Player | Faction::Ally, Faction::Hostile) => true,
            _ => false,
        }
    }

    pub fn is_allied_with(self, other: Faction) -> bool {
        self == other
            || matches!(
                (self, other),
                (Faction::Player, Faction::Ally) | (Faction::Ally, Faction::Player)
            )
    }
}

/// The six ability scores.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ability {
    #[strum(serialize = "STR", serialize = "strength")]
    Strength,
    #[strum(serialize = "DEX", serialize = "dexterity")]
    Dexterity,
    #[strum(serialize = "CON", serialize = "constitution")]
    Constitution,
    #[strum(serialize = "INT", serialize = "intelligence")]
    Intelligence,
    #[strum(serialize = "WIS", serialize = "wisdom")]
    Wisdom,
    #[strum(serialize = "CHA", serialize = "charisma")]
    Charisma,
}

/// Raw ability scores. Modifiers follow `floor((score - 10) / 2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub const fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        (self.score(ability) - 10).div_euclid(2)
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_modifier_rounds_down() {
        let scores = AbilityScores::new(8, 9, 10, 11, 18, 1);
        assert_eq!(scores.modifier(Ability::Strength), -1);
        assert_eq!(scores.modifier(Ability::Dexterity), -1);
        assert_eq!(scores.modifier(Ability::Constitution), 0);
        assert_eq!(scores.modifier(Ability::Intelligence), 0);
        assert_eq!(scores.modifier(Ability::Wisdom), 4);
        assert_eq!(scores.modifier(Ability::Charisma), -5);
    }

    #[test]
    fn chebyshev_distance_and_steps() {
        let a = GridPos::new(0, 0);
        let b = GridPos::new(3, -2);
        assert_eq!(a.distance(b), 3);
        assert_eq!(a.step_toward(b), GridPos::new(1, -1));
        assert_eq!(b.step_away_from(a), GridPos::new(4, -3));
        assert_eq!(a.cells_within(1).count(), 9);
    }

    #[test]
    fn factions_pair_up() {
        assert!(Faction::Player.is_hostile_to(Faction::Hostile));
        assert!(Faction::Ally.is_allied_with(Faction::Player));
        assert!(!Faction::Neutral.is_hostile_to(Faction::Hostile));
        assert_eq!("hostile".parse::<Faction>().unwrap(), Faction::Hostile);
        assert_eq!("CON".parse::<Ability>().unwrap(), Ability::Constitution);
    }
}
