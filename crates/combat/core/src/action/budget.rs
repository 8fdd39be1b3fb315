//! Per-turn action economy.

use std::collections::BTreeMap;
use std::fmt;

/// A budget line an ability can spend.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    Action,
    BonusAction,
    Movement,
    Reaction,
    /// Named pool such as `"spell_slot_1"` or `"bardic_inspiration"`.
    Custom(String),
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Action => f.write_str("action"),
            ResourceKind::BonusAction => f.write_str("bonus action"),
            ResourceKind::Movement => f.write_str("movement"),
            ResourceKind::Reaction => f.write_str("reaction"),
            ResourceKind::Custom(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counter {
    pub current: u32,
    pub maximum: u32,
}

impl Counter {
    pub const fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    fn restore(&mut self) {
        self.current = self.maximum;
    }
}

/// Amounts an ability or reaction spends.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionCost {
    pub action: u32,
    pub bonus_action: u32,
    pub movement: u32,
    pub reaction: u32,
    pub custom: BTreeMap<String, u32>,
}

impl ActionCost {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn action() -> Self {
        Self {
            action: 1,
            ..Self::default()
        }
    }

    pub fn bonus_action() -> Self {
        Self {
            bonus_action: 1,
            ..Self::default()
        }
    }

    pub fn reaction() -> Self {
        Self {
            reaction: 1,
            ..Self::default()
        }
    }

    pub fn movement(amount: u32) -> Self {
        Self {
            movement: amount,
            ..Self::default()
        }
    }

    pub fn with_custom(mut self, name: impl Into<String>, amount: u32) -> Self {
        self.custom.insert(name.into(), amount);
        self
    }

    pub fn is_free(&self) -> bool {
        self.action == 0
            && self.bonus_action == 0
            && self.movement == 0
            && self.reaction == 0
            && self.custom.values().all(|amount| *amount == 0)
    }

    /// Every `(resource, amount)` pair with a non-zero amount.
    pub fn entries(&self) -> Vec<(ResourceKind, u32)> {
        let mut entries = Vec::new();
        for (kind, amount) in [
            (ResourceKind::Action, self.action),
            (ResourceKind::BonusAction, self.bonus_action),
            (ResourceKind::Movement, self.movement),
            (ResourceKind::Reaction, self.reaction),
        ] {
            if amount > 0 {
                entries.push((kind, amount));
            }
        }
        for (name, amount) in &self.custom {
            if *amount > 0 {
                entries.push((ResourceKind::Custom(name.clone()), *amount));
            }
        }
        entries
    }
}

/// First budget line that could not cover a cost.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceShortfall {
    pub resource: ResourceKind,
    pub required: u32,
    pub available: u32,
}

/// Counters for one combatant.
///
/// Counters are unsigned and [`ActionBudget::consume`] checks every line
/// before touching any of them, so a rejected cost debits nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionBudget {
    action: Counter,
    bonus_action: Counter,
    movement: Counter,
    reaction: Counter,
    custom: BTreeMap<String, Counter>,
}

impl ActionBudget {
    /// Standard economy: one action, one bonus action, `speed` movement, one reaction.
    pub fn standard(speed: u32) -> Self {
        Self {
            action: Counter::full(1),
            bonus_action: Counter::full(1),
            movement: Counter::full(speed),
            reaction: Counter::full(1),
            custom: BTreeMap::new(),
        }
    }

    pub fn with_resource(mut self, name: impl Into<String>, maximum: u32) -> Self {
        self.custom.insert(name.into(), Counter::full(maximum));
        self
    }

    pub fn counter(&self, kind: &ResourceKind) -> Option<&Counter> {
        match kind {
            ResourceKind::Action => Some(&self.action),
            ResourceKind::BonusAction => Some(&self.bonus_action),
            ResourceKind::Movement => Some(&self.movement),
            ResourceKind::Reaction => Some(&self.reaction),
            ResourceKind::Custom(name) => self.custom.get(name),
        }
    }

    fn counter_mut(&mut self, kind: &ResourceKind) -> Option<&mut Counter> {
        match kind {
            ResourceKind::Action => Some(&mut self.action),
            ResourceKind::BonusAction => Some(&mut self.bonus_action),
            ResourceKind::Movement => Some(&mut self.movement),
            ResourceKind::Reaction => Some(&mut self.reaction),
            ResourceKind::Custom(name) => self.custom.get_mut(name),
        }
    }

    pub fn remaining(&self, kind: &ResourceKind) -> u32 {
        self.counter(kind).map_or(0, |counter| counter.current)
    }

    pub fn custom(&self) -> &BTreeMap<String, Counter> {
        &self.custom
    }

    pub fn can_afford(&self, cost: &ActionCost) -> Result<(), ResourceShortfall> {
        for (resource, required) in cost.entries() {
            let available = self.remaining(&resource);
            if available < required {
                return Err(ResourceShortfall {
                    resource,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Debits every line of `cost`, or nothing at all.
    pub fn consume(&mut self, cost: &ActionCost) -> Result<(), ResourceShortfall> {
        self.can_afford(cost)?;
        for (resource, amount) in cost.entries() {
            if let Some(counter) = self.counter_mut(&resource) {
                counter.current -= amount;
            }
        }
        Ok(())
    }

    /// Start of the owner's turn. Reaction and custom pools are left alone.
    pub fn reset_for_turn(&mut self) {
        self.action.restore();
        self.bonus_action.restore();
        self.movement.restore();
    }

    /// Start of a round, for every combatant regardless of turn order.
    pub fn reset_for_round(&mut self) {
        self.reaction.restore();
    }

    /// Adds `amount` back to a line, capped at its maximum. Returns what was restored.
    pub fn restore(&mut self, kind: &ResourceKind, amount: u32) -> u32 {
        match self.counter_mut(kind) {
            Some(counter) => {
                let before = counter.current;
                counter.current = counter.current.saturating_add(amount).min(counter.maximum);
                counter.current - before
            }
            None => 0,
        }
    }

    /// Sets the movement maximum (speed changes between turns).
    pub fn set_movement_max(&mut self, speed: u32) {
        self.movement.maximum = speed;
        self.movement.current = self.movement.current.min(speed);
    }

    /// Drops remaining movement to zero (speed-zero conditions).
    pub fn clear_movement(&mut self) {
        self.movement.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_is_atomic() {
        let mut budget = ActionBudget::standard(30).with_resource("spell_slot_1", 1);
        let cost = ActionCost::action().with_custom("spell_slot_1", 2);

        let shortfall = budget.consume(&cost).unwrap_err();
        assert_eq!(shortfall.resource, ResourceKind::Custom("spell_slot_1".into()));
        assert_eq!(budget.remaining(&ResourceKind::Action), 1);
        assert_eq!(budget.remaining(&ResourceKind::Custom("spell_slot_1".into())), 1);
    }

    #[test]
    fn unknown_custom_resource_is_unaffordable() {
        let budget = ActionBudget::standard(30);
        assert!(
            budget
                .can_afford(&ActionCost::free().with_custom("ki", 1))
                .is_err()
        );
    }

    #[test]
    fn turn_reset_leaves_reaction_alone() {
        let mut budget = ActionBudget::standard(30);
        budget
            .consume(&ActionCost {
                action: 1,
                bonus_action: 1,
                movement: 15,
                reaction: 1,
                custom: BTreeMap::new(),
            })
            .unwrap();

        budget.reset_for_turn();
        assert_eq!(budget.remaining(&ResourceKind::Action), 1);
        assert_eq!(budget.remaining(&ResourceKind::Movement), 30);
        assert_eq!(budget.remaining(&ResourceKind::Reaction), 0);

        budget.reset_for_round();
        assert_eq!(budget.remaining(&ResourceKind::Reaction), 1);
    }

    #[test]
    fn restore_caps_at_maximum() {
        let mut budget = ActionBudget::standard(30).with_resource("rage", 2);
        budget.consume(&ActionCost::free().with_custom("rage", 1)).unwrap();
        assert_eq!(budget.restore(&ResourceKind::Custom("rage".into()), 5), 1);
        assert_eq!(budget.remaining(&ResourceKind::Custom("rage".into())), 2);
    }
}
