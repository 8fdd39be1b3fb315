/// Rules constants and tunable parameters for one encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Movement units one tile costs before terrain multipliers (5 ft squares).
    pub tile_size: u32,

    /// How many reactions may nest inside each other before the chain is refused.
    pub max_reaction_depth: usize,

    /// Round limit after which the encounter ends as a draw.
    pub max_rounds: u32,

    /// Floor for the concentration save DC (`max(floor, damage / 2)`).
    pub concentration_min_dc: u32,

    /// Successful death saves that stabilise a downed combatant.
    pub death_save_successes: u8,

    /// Failed death saves that kill a downed combatant.
    pub death_save_failures: u8,

    /// Number of events retained in the replay log.
    pub event_log_capacity: usize,
}

impl CombatConfig {
    // ===== compile-time limits =====
    /// Hard cap on stack counts, regardless of a definition's own maximum.
    pub const MAX_STACKS: u8 = 99;
    /// Most d20s a single check can roll (advantage plus one reroll each).
    pub const MAX_CHECK_DICE: usize = 4;
    /// Natural result that always succeeds on attack rolls and death saves.
    pub const NATURAL_MAX: u32 = 20;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TILE_SIZE: u32 = 5;
    pub const DEFAULT_MAX_REACTION_DEPTH: usize = 8;
    pub const DEFAULT_MAX_ROUNDS: u32 = 100;
    pub const DEFAULT_CONCENTRATION_MIN_DC: u32 = 10;
    pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 4096;

    pub fn new() -> Self {
        Self {
            tile_size: Self::DEFAULT_TILE_SIZE,
            max_reaction_depth: Self::DEFAULT_MAX_REACTION_DEPTH,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            concentration_min_dc: Self::DEFAULT_CONCENTRATION_MIN_DC,
            death_save_successes: 3,
            death_save_failures: 3,
            event_log_capacity: Self::DEFAULT_EVENT_LOG_CAPACITY,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_max_reaction_depth(mut self, depth: usize) -> Self {
        self.max_reaction_depth = depth;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
