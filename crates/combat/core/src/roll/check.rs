//! d20-style checks: advantage, floors, rerolls, ordered modifiers.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;

use super::{
    AdvantageState, DiceExpr, DieRoller, Modifier, ModifierSource, order_modifiers,
};

/// Everything needed to resolve one check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollCheck {
    /// Faces on the base die (20 for attacks, saves, and checks).
    pub sides: u32,
    pub modifiers: Vec<Modifier>,
    /// Dice-valued bonuses such as Bless (`1d4`), rolled after the base die.
    pub bonus_dice: Vec<(ModifierSource, String, DiceExpr)>,
    pub advantage: AdvantageState,
    /// Minimum value of the kept die ("treat rolls below 10 as 10").
    pub floor: Option<u32>,
    /// Reroll each base die once when it shows this value or lower.
    pub reroll_at_or_below: Option<u32>,
}

/// One line of a roll breakdown.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreakdownEntry {
    pub label: String,
    pub source: Option<ModifierSource>,
    pub value: i32,
}

/// Outcome of a [`RollCheck`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollResult {
    /// Face of the kept die before any floor.
    pub natural: u32,
    /// Every base die that ended up on the table, after rerolls.
    pub dice: ArrayVec<u32, { CombatConfig::MAX_CHECK_DICE }>,
    pub advantage: AdvantageState,
    /// Kept die after the floor is applied.
    pub die_value: u32,
    pub total: i32,
    pub breakdown: Vec<BreakdownEntry>,
}

impl RollResult {
    pub fn is_natural_max(&self) -> bool {
        self.natural == CombatConfig::NATURAL_MAX
    }

    pub fn is_natural_one(&self) -> bool {
        self.natural == 1
    }
}

impl RollCheck {
    pub fn d20() -> Self {
        Self {
            sides: 20,
            modifiers: Vec::new(),
            bonus_dice: Vec::new(),
            advantage: AdvantageState::Normal,
            floor: None,
            reroll_at_or_below: None,
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_bonus_dice(
        mut self,
        source: ModifierSource,
        label: impl Into<String>,
        dice: DiceExpr,
    ) -> Self {
        self.bonus_dice.push((source, label.into(), dice));
        self
    }

    pub fn with_advantage(mut self, advantage: AdvantageState) -> Self {
        self.advantage = advantage;
        self
    }

    pub fn with_floor(mut self, floor: u32) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn with_reroll_at_or_below(mut self, threshold: u32) -> Self {
        self.reroll_at_or_below = Some(threshold);
        self
    }

    pub fn resolve(self, roller: &mut dyn DieRoller) -> RollResult {
        let mut dice = ArrayVec::<u32, { CombatConfig::MAX_CHECK_DICE }>::new();
        let mut kept: Vec<u32> = Vec::with_capacity(2);

        for _ in 0..self.advantage.dice() {
            let mut face = roller.roll_die(self.sides);
            if let Some(threshold) = self.reroll_at_or_below
                && face <= threshold
            {
                dice.push(face);
                face = roller.roll_die(self.sides);
            }
            dice.push(face);
            kept.push(face);
        }

        let natural = match self.advantage {
            AdvantageState::Normal => kept[0],
            AdvantageState::Advantage => kept.iter().copied().max().unwrap_or(1),
            AdvantageState::Disadvantage => kept.iter().copied().min().unwrap_or(1),
        };
        let die_value = self.floor.map_or(natural, |floor| natural.max(floor));

        let mut breakdown = vec![BreakdownEntry {
            label: format!("d{}", self.sides),
            source: None,
            value: die_value as i32,
        }];

        let mut applied: Vec<Modifier> = self.modifiers;
        for (source, label, expr) in &self.bonus_dice {
            let outcome = expr.roll(roller);
            applied.push(Modifier::new(*source, label.clone(), outcome.total));
        }
        order_modifiers(&mut applied);

        let mut total = die_value as i32;
        for modifier in applied {
            total += modifier.value;
            breakdown.push(BreakdownEntry {
                label: modifier.label,
                source: Some(modifier.source),
                value: modifier.value,
            });
        }

        RollResult {
            natural,
            dice,
            advantage: self.advantage,
            die_value,
            total,
            breakdown,
        }
    }
}
