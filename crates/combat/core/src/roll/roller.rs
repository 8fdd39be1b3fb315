use std::collections::VecDeque;

use crate::env::{RngOracle, compute_seed};

use super::DieRoller;

/// Seed and monotonic roll counter persisted with the encounter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceState {
    pub seed: u64,
    /// Number of dice rolled so far. Never decreases.
    pub roll_index: u64,
}

impl DiceState {
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            roll_index: 0,
        }
    }
}

/// Rolls dice from an [`RngOracle`], one seed per roll index.
pub struct SeededRoller<'a> {
    rng: &'a dyn RngOracle,
    dice: &'a mut DiceState,
}

impl<'a> SeededRoller<'a> {
    pub fn new(rng: &'a dyn RngOracle, dice: &'a mut DiceState) -> Self {
        Self { rng, dice }
    }
}

impl DieRoller for SeededRoller<'_> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let seed = compute_seed(self.dice.seed, self.dice.roll_index, 0, 0);
        self.dice.roll_index += 1;
        self.rng.roll_die(seed, sides.max(1))
    }
}

/// Replays a fixed list of faces. Once exhausted it keeps returning the last face.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRoller {
    faces: VecDeque<u32>,
    last: u32,
}

impl ScriptedRoller {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            last: 1,
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DieRoller for ScriptedRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if let Some(face) = self.faces.pop_front() {
            self.last = face;
        }
        self.last.clamp(1, sides.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    #[test]
    fn seeded_roller_is_reproducible_and_advances_index() {
        let rng = PcgRng;
        let mut a = DiceState::new(42);
        let mut b = DiceState::new(42);

        let first: Vec<u32> = {
            let mut roller = SeededRoller::new(&rng, &mut a);
            (0..16).map(|_| roller.roll_die(20)).collect()
        };
        let second: Vec<u32> = {
            let mut roller = SeededRoller::new(&rng, &mut b);
            (0..16).map(|_| roller.roll_die(20)).collect()
        };

        assert_eq!(first, second);
        assert_eq!(a.roll_index, 16);
        assert!(first.iter().all(|face| (1..=20).contains(face)));
    }

    #[test]
    fn resuming_from_roll_index_continues_the_sequence() {
        let rng = PcgRng;
        let mut full = DiceState::new(7);
        let all: Vec<u32> = {
            let mut roller = SeededRoller::new(&rng, &mut full);
            (0..10).map(|_| roller.roll_die(6)).collect()
        };

        let mut resumed = DiceState {
            seed: 7,
            roll_index: 4,
        };
        let tail: Vec<u32> = {
            let mut roller = SeededRoller::new(&rng, &mut resumed);
            (0..6).map(|_| roller.roll_die(6)).collect()
        };
        assert_eq!(&all[4..], tail.as_slice());
    }

    #[test]
    fn scripted_roller_clamps_and_repeats() {
        let mut roller = ScriptedRoller::new([25, 3]);
        assert_eq!(roller.roll_die(20), 20);
        assert_eq!(roller.roll_die(20), 3);
        assert_eq!(roller.roll_die(20), 3);
    }
}
