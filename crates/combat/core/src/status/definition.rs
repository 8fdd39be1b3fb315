//! Static status data. Instances reference these by [`StatusId`].

use crate::action::ResourceKind;
use crate::damage::{DamageAffinity, DamageType};
use crate::roll::DiceExpr;
use crate::state::{Ability, StatusId};

use super::Condition;

/// What happens when a status already present is applied again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingPolicy {
    /// Keep one instance and reset its duration.
    #[default]
    Refresh,
    /// Keep one instance, refresh duration, and add a stack up to `max`.
    Stack { max: u8 },
}

/// How long an instance lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusDuration {
    /// Ticks down at the status' tick phase; removed at zero.
    Turns(u32),
    /// Lasts until one of the definition's removal triggers fires.
    UntilEvent,
    Permanent,
}

/// When `on_tick` functors run and turn durations decrement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TickPhase {
    /// Start of the affected combatant's turn.
    #[default]
    TurnStart,
    /// End of the affected combatant's turn.
    TurnEnd,
    /// Once per round boundary, in initiative order.
    RoundEnd,
}

/// Small parametrised routine attached to a lifecycle phase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusFunctor {
    Damage {
        dice: DiceExpr,
        damage_type: DamageType,
        /// Multiply by the current stack count.
        #[cfg_attr(feature = "serde", serde(default))]
        per_stack: bool,
    },
    Heal {
        dice: DiceExpr,
    },
    TemporaryHp {
        dice: DiceExpr,
    },
    /// The affected combatant saves; success can end the status.
    SavingThrow {
        ability: Ability,
        dc: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        ends_on_success: bool,
    },
    ApplyStatus {
        status: StatusId,
        #[cfg_attr(feature = "serde", serde(default))]
        duration: Option<u32>,
    },
    RemoveStatus {
        status: StatusId,
    },
    RestoreResource {
        resource: ResourceKind,
        amount: u32,
    },
}

/// Event kinds an `UntilEvent` status can be keyed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalEvent {
    DamageTaken,
    AttackMade,
    AbilityUsed,
    Moved,
    TurnStarted,
    TurnEnded,
}

/// Extra filter on a removal event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalPredicate {
    #[default]
    Any,
    /// Only when the event was caused by the status' own source.
    FromSource,
    /// Only damage of this type.
    DamageType(DamageType),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemovalTrigger {
    pub event: RemovalEvent,
    #[cfg_attr(feature = "serde", serde(default))]
    pub predicate: RemovalPredicate,
}

/// Which roll a data-declared bonus feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollTarget {
    AttackRoll,
    SavingThrow,
    Damage,
}

/// Bonus a status adds to its carrier's rolls (Bless: `1d4` on attacks and saves).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollBonus {
    pub applies_to: Vec<RollTarget>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dice: Option<DiceExpr>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flat: i32,
}

/// Ability components a status can suppress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Component {
    Verbal,
    Somatic,
    Material,
}

/// Things a status forbids its carrier from doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionBlock {
    /// Abilities with this component (Silence blocks Verbal).
    Component(Component),
    Spells,
    Attacks,
    Movement,
    Reactions,
    BonusActions,
}

/// Behaviour switches that do not fit elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusFlag {
    /// Leaving threatened cells does not provoke (Disengage).
    NoOpportunityAttacks,
    /// Attack rolls against the carrier have disadvantage (Dodge).
    AttackersHaveDisadvantage,
    /// The carrier's attack rolls have advantage (Reckless, Hidden).
    AttacksHaveAdvantage,
}

/// Immutable status definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusDefinition {
    pub id: StatusId,
    pub name: String,
    /// Tags matched against immunities (e.g. `"poison"`, `"charm"`, `"magical"`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<Condition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacking: StackingPolicy,
    pub duration: StatusDuration,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_phase: TickPhase,
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_apply: Vec<StatusFunctor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_tick: Vec<StatusFunctor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_remove: Vec<StatusFunctor>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub remove_on: Vec<RemovalTrigger>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affinities: Vec<DamageAffinity>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub roll_bonuses: Vec<RollBonus>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocks: Vec<ActionBlock>,
    /// Tags this status makes its carrier immune to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub grants_immunity: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ac_bonus: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: Vec<StatusFlag>,
}

impl StatusDefinition {
    /// Minimal definition used by tests and programmatic content.
    pub fn new(id: impl Into<String>, duration: StatusDuration) -> Self {
        let id = StatusId::new(id);
        Self {
            name: id.to_string(),
            id,
            tags: Vec::new(),
            conditions: Vec::new(),
            stacking: StackingPolicy::Refresh,
            duration,
            tick_phase: TickPhase::TurnStart,
            on_apply: Vec::new(),
            on_tick: Vec::new(),
            on_remove: Vec::new(),
            remove_on: Vec::new(),
            affinities: Vec::new(),
            roll_bonuses: Vec::new(),
            blocks: Vec::new(),
            grants_immunity: Vec::new(),
            ac_bonus: 0,
            flags: Vec::new(),
        }
    }

    pub fn max_stacks(&self) -> u8 {
        match self.stacking {
            StackingPolicy::Refresh => 1,
            StackingPolicy::Stack { max } => max.min(crate::config::CombatConfig::MAX_STACKS),
        }
    }

    pub fn has_flag(&self, flag: StatusFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn grants(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    /// True when any of this status' tags (or its id) is in `immunities`.
    pub fn is_blocked_by(&self, immunities: &[String]) -> bool {
        immunities.iter().any(|immunity| {
            immunity == self.id.as_str() || self.tags.iter().any(|tag| tag == immunity)
        })
    }
}
