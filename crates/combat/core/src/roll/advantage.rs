//! Advantage / disadvantage bookkeeping.

/// Net advantage state for a single d20 roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdvantageState {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl AdvantageState {
    /// Number of d20s to roll before choosing.
    pub const fn dice(self) -> usize {
        match self {
            Self::Normal => 1,
            Self::Advantage | Self::Disadvantage => 2,
        }
    }
}

/// Counts advantage and disadvantage sources; they cancel pairwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvantageTally {
    advantage: u32,
    disadvantage: u32,
}

impl AdvantageTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advantage(&mut self) -> &mut Self {
        self.advantage += 1;
        self
    }

    pub fn disadvantage(&mut self) -> &mut Self {
        self.disadvantage += 1;
        self
    }

    pub fn add(&mut self, advantage: u32, disadvantage: u32) -> &mut Self {
        self.advantage += advantage;
        self.disadvantage += disadvantage;
        self
    }

    pub fn net(&self) -> AdvantageState {
        match self.advantage.cmp(&self.disadvantage) {
            core::cmp::Ordering::Greater => AdvantageState::Advantage,
            core::cmp::Ordering::Less => AdvantageState::Disadvantage,
            core::cmp::Ordering::Equal => AdvantageState::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_cancel_pairwise() {
        assert_eq!(AdvantageTally::new().net(), AdvantageState::Normal);
        assert_eq!(
            AdvantageTally::new().advantage().net(),
            AdvantageState::Advantage
        );
        assert_eq!(
            AdvantageTally::new().advantage().disadvantage().net(),
            AdvantageState::Normal
        );
        assert_eq!(
            AdvantageTally::new().add(2, 1).net(),
            AdvantageState::Advantage
        );
        assert_eq!(
            AdvantageTally::new().add(1, 3).net(),
            AdvantageState::Disadvantage
        );
    }
}
