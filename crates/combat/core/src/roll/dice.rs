//! Dice notation (`NdM+K`).

use std::fmt;
use std::str::FromStr;

use super::DieRoller;

/// Errors produced while parsing dice notation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("missing 'd' in dice notation '{0}'")]
    MissingSeparator(String),

    #[error("invalid dice count in '{0}'")]
    InvalidCount(String),

    #[error("invalid die size in '{0}'")]
    InvalidSides(String),

    #[error("invalid modifier in '{0}'")]
    InvalidModifier(String),
}

/// A dice formula such as `2d6+3`.
///
/// A zero count is allowed and denotes a flat amount (`0d0+4` displays as `4`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

/// Individual dice and the resulting total of one [`DiceExpr`] roll.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceOutcome {
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
}

impl DiceExpr {
    pub const fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// A formula with no dice.
    pub const fn flat(amount: i32) -> Self {
        Self::new(0, 0, amount)
    }

    /// Same formula with the dice count doubled (critical hits).
    pub fn doubled(self) -> Self {
        Self {
            count: self.count.saturating_mul(2),
            ..self
        }
    }

    pub fn with_modifier(self, extra: i32) -> Self {
        Self {
            modifier: self.modifier.saturating_add(extra),
            ..self
        }
    }

    pub fn min(&self) -> i32 {
        clamp_i32(self.count).saturating_add(self.modifier)
    }

    pub fn max(&self) -> i32 {
        clamp_i32(self.count.saturating_mul(self.sides)).saturating_add(self.modifier)
    }

    pub fn roll(&self, roller: &mut dyn DieRoller) -> DiceOutcome {
        let rolls: Vec<u32> = (0..self.count)
            .filter(|_| self.sides > 0)
            .map(|_| roller.roll_die(self.sides))
            .collect();
        let sum = rolls.iter().fold(0u32, |acc, face| acc.saturating_add(*face));
        DiceOutcome {
            total: clamp_i32(sum).saturating_add(self.modifier),
            rolls,
            modifier: self.modifier,
        }
    }
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let notation: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let notation = notation.to_ascii_lowercase();

        // Plain integers are flat amounts.
        if let Ok(flat) = notation.parse::<i32>() {
            return Ok(Self::flat(flat));
        }

        let d_pos = notation
            .find('d')
            .ok_or_else(|| DiceError::MissingSeparator(s.to_owned()))?;

        let count_str = &notation[..d_pos];
        let count = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse::<u32>()
                .map_err(|_| DiceError::InvalidCount(s.to_owned()))?
        };

        let rest = &notation[d_pos + 1..];
        let split = rest.find(['+', '-']);
        let (sides_str, modifier) = match split {
            Some(pos) => {
                let modifier = rest[pos..]
                    .trim_start_matches('+')
                    .parse::<i32>()
                    .map_err(|_| DiceError::InvalidModifier(s.to_owned()))?;
                (&rest[..pos], modifier)
            }
            None => (rest, 0),
        };

        let sides = sides_str
            .parse::<u32>()
            .map_err(|_| DiceError::InvalidSides(s.to_owned()))?;
        if sides == 0 && count > 0 {
            return Err(DiceError::InvalidSides(s.to_owned()));
        }

        Ok(Self::new(count, sides, modifier))
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(value: DiceExpr) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "{}", self.modifier);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::ScriptedRoller;

    #[test]
    fn parses_common_notation() {
        assert_eq!("2d6+3".parse::<DiceExpr>().unwrap(), DiceExpr::new(2, 6, 3));
        assert_eq!("d20".parse::<DiceExpr>().unwrap(), DiceExpr::new(1, 20, 0));
        assert_eq!("1d4-1".parse::<DiceExpr>().unwrap(), DiceExpr::new(1, 4, -1));
        assert_eq!(" 3D8 ".parse::<DiceExpr>().unwrap(), DiceExpr::new(3, 8, 0));
        assert_eq!("7".parse::<DiceExpr>().unwrap(), DiceExpr::flat(7));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "fireball".parse::<DiceExpr>(),
            Err(DiceError::InvalidCount(_))
        ));
        assert!(matches!(
            "2x6".parse::<DiceExpr>(),
            Err(DiceError::MissingSeparator(_))
        ));
        assert!(matches!(
            "1d0".parse::<DiceExpr>(),
            Err(DiceError::InvalidSides(_))
        ));
    }

    #[test]
    fn display_round_trips_signs() {
        assert_eq!(DiceExpr::new(2, 6, 3).to_string(), "2d6+3");
        assert_eq!(DiceExpr::new(1, 4, -1).to_string(), "1d4-1");
        assert_eq!(DiceExpr::flat(5).to_string(), "5");
    }

    #[test]
    fn doubled_dice_keep_modifier() {
        let crit = DiceExpr::new(1, 8, 3).doubled();
        assert_eq!(crit, DiceExpr::new(2, 8, 3));
        assert_eq!(crit.max(), 19);
    }

    #[test]
    fn oversized_formulas_saturate() {
        let huge = DiceExpr::new(u32::MAX, 20, i32::MAX);
        assert_eq!(huge.doubled().count, u32::MAX);
        assert_eq!(huge.max(), i32::MAX);
        assert_eq!(huge.min(), i32::MAX);
        assert_eq!(DiceExpr::flat(i32::MAX).with_modifier(5).modifier, i32::MAX);
    }

    #[test]
    fn roll_sums_dice_and_modifier() {
        let mut roller = ScriptedRoller::new([4, 6]);
        let outcome = DiceExpr::new(2, 6, 1).roll(&mut roller);
        assert_eq!(outcome.rolls, vec![4, 6]);
        assert_eq!(outcome.total, 11);
    }
}
