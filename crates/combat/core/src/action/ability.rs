//! Immutable ability definitions.

use crate::state::{Ability, AbilityId};
use crate::status::{AttackRange, Component};

use super::{ActionCost, Effect, EffectCondition, TargetRule};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityCategory {
    #[default]
    Weapon,
    Spell,
    Class,
    Item,
}

/// The ability makes an attack roll against each target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackSpec {
    pub ability: Ability,
    pub range: AttackRange,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub proficient: bool,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DcFormula {
    Fixed(u32),
    /// `8 + proficiency + spellcasting modifier`.
    SpellSave,
    /// `8 + proficiency + modifier` of the given ability.
    Ability(Ability),
}

/// Each target makes a saving throw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveSpec {
    pub ability: Ability,
    pub dc: DcFormula,
    #[cfg_attr(feature = "serde", serde(default))]
    pub half_on_success: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cooldown {
    #[default]
    None,
    /// Unusable for this many of the owner's turns after use.
    Turns(u32),
    /// Limited uses per encounter.
    Charges(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: AbilityCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub components: Vec<Component>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ActionCost,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targeting: TargetRule,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack: Option<AttackSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub save: Option<SaveSpec>,
    pub effects: Vec<Effect>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub concentration: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: Cooldown,
}

impl AbilityDefinition {
    pub fn new(id: impl Into<String>, cost: ActionCost, targeting: TargetRule) -> Self {
        let id = AbilityId::new(id);
        Self {
            name: id.to_string(),
            id,
            category: AbilityCategory::Weapon,
            components: Vec::new(),
            cost,
            targeting,
            attack: None,
            save: None,
            effects: Vec::new(),
            concentration: false,
            cooldown: Cooldown::None,
        }
    }

    pub fn is_spell(&self) -> bool {
        self.category == AbilityCategory::Spell
    }

    pub fn is_attack(&self) -> bool {
        self.attack.is_some()
    }

    pub fn is_harmful(&self) -> bool {
        self.attack.is_some()
            || self.save.is_some()
            || self.effects.iter().any(Effect::is_damage)
    }

    /// True when some effect is gated on an attack outcome.
    pub fn uses_attack_gates(&self) -> bool {
        self.effects.iter().any(|effect| {
            matches!(
                effect.when,
                EffectCondition::OnHit | EffectCondition::OnMiss | EffectCondition::OnCritical
            )
        })
    }

    pub fn uses_save_gates(&self) -> bool {
        self.effects.iter().any(|effect| {
            matches!(
                effect.when,
                EffectCondition::OnFailedSave | EffectCondition::OnSuccessfulSave
            )
        })
    }
}
