//! Rule hooks: pluggable modifiers consulted at fixed roll windows.
//!
//! Hooks only contribute numbers. They never mutate state, so the same
//! window asked twice with the same state yields the same modifiers.

use std::sync::Arc;

use crate::env::DefinitionOracle;
use crate::roll::DiceExpr;
use crate::state::{Ability, AbilityId, CombatState, CombatantId};
use crate::status::RollTarget;

/// Where in the pipeline a hook is being asked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowKind {
    BeforeAttackRoll,
    BeforeSavingThrow,
    BeforeDamage,
}

impl WindowKind {
    pub fn roll_target(self) -> RollTarget {
        match self {
            WindowKind::BeforeAttackRoll => RollTarget::AttackRoll,
            WindowKind::BeforeSavingThrow => RollTarget::SavingThrow,
            WindowKind::BeforeDamage => RollTarget::Damage,
        }
    }
}

/// The roll about to happen.
#[derive(Clone, Copy, Debug)]
pub struct RuleWindow<'a> {
    pub kind: WindowKind,
    /// Whoever is rolling: the attacker, the saver, or the damage dealer.
    pub actor: CombatantId,
    pub target: Option<CombatantId>,
    pub ability: Option<&'a AbilityId>,
    /// Set for saving throw windows.
    pub save_ability: Option<Ability>,
}

/// One contribution to a roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookModifier {
    pub label: String,
    pub flat: i32,
    pub dice: Option<DiceExpr>,
}

/// A rule module consulted before attack rolls, saves, and damage.
///
/// Hooks run in priority order (lower values first).
pub trait RuleHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn modifiers(
        &self,
        window: &RuleWindow<'_>,
        state: &CombatState,
        definitions: &dyn DefinitionOracle,
    ) -> Vec<HookModifier>;
}

/// Feeds `roll_bonuses` declared on statuses into the matching windows.
#[derive(Debug)]
pub struct StatusRollBonusHook;

impl RuleHook for StatusRollBonusHook {
    fn name(&self) -> &'static str {
        "status_roll_bonus"
    }

    fn modifiers(
        &self,
        window: &RuleWindow<'_>,
        state: &CombatState,
        definitions: &dyn DefinitionOracle,
    ) -> Vec<HookModifier> {
        let wanted = window.kind.roll_target();
        state
            .statuses_on(window.actor, definitions)
            .into_iter()
            .flat_map(|(_, definition)| {
                definition
                    .roll_bonuses
                    .iter()
                    .filter(move |bonus| bonus.applies_to.contains(&wanted))
                    .map(move |bonus| HookModifier {
                        label: definition.name.clone(),
                        flat: bonus.flat,
                        dice: bonus.dice,
                    })
            })
            .collect()
    }
}

/// Ordered set of rule hooks.
#[derive(Clone)]
pub struct RuleHooks {
    hooks: Vec<Arc<dyn RuleHook>>,
}

impl RuleHooks {
    pub fn empty() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn add(&mut self, hook: Arc<dyn RuleHook>) {
        self.hooks.push(hook);
        self.hooks.sort_by_key(|h| h.priority());
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn collect(
        &self,
        window: &RuleWindow<'_>,
        state: &CombatState,
        definitions: &dyn DefinitionOracle,
    ) -> Vec<HookModifier> {
        self.hooks
            .iter()
            .flat_map(|hook| hook.modifiers(window, state, definitions))
            .collect()
    }
}

impl Default for RuleHooks {
    fn default() -> Self {
        let mut hooks = Self::empty();
        hooks.add(Arc::new(StatusRollBonusHook));
        hooks
    }
}

impl std::fmt::Debug for RuleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, i32);

    impl RuleHook for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn priority(&self) -> i32 {
            self.1
        }

        fn modifiers(
            &self,
            _window: &RuleWindow<'_>,
            _state: &CombatState,
            _definitions: &dyn DefinitionOracle,
        ) -> Vec<HookModifier> {
            Vec::new()
        }
    }

    #[test]
    fn hooks_sort_by_priority() {
        let mut hooks = RuleHooks::empty();
        hooks.add(Arc::new(Fixed("late", 10)));
        hooks.add(Arc::new(Fixed("early", -5)));
        hooks.add(Arc::new(StatusRollBonusHook));
        assert_eq!(hooks.names(), vec!["early", "status_roll_bonus", "late"]);
    }
}
