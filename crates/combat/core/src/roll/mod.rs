//! Dice and d20 check resolution.
//!
//! Everything here is pure: a [`DieRoller`] supplies faces, the rest is
//! arithmetic. The engine drives rolls through [`SeededRoller`], which reads
//! the encounter seed and bumps the monotonic roll index so a restored
//! snapshot replays identically.

mod advantage;
mod check;
mod dice;
mod modifier;
mod roller;

pub use advantage::{AdvantageState, AdvantageTally};
pub use check::{BreakdownEntry, RollCheck, RollResult};
pub use dice::{DiceError, DiceExpr, DiceOutcome};
pub use modifier::{Modifier, ModifierSource, order_modifiers};
pub use roller::{DiceState, ScriptedRoller, SeededRoller};

/// Source of individual die faces.
pub trait DieRoller {
    /// Returns a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;
}
