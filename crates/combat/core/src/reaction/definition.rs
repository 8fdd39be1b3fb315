use crate::action::ActionCost;
use crate::state::{AbilityId, ReactionId};

use super::TriggerKind;

/// How the reactor must relate to the pending item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactorRelation {
    /// The reactor is the one being hit.
    #[default]
    ReactorIsTarget,
    /// The item's source is hostile to the reactor (opportunity attacks, counterspell).
    HostileSource,
    /// The item targets one of the reactor's allies.
    AllyTarget,
    Any,
}

/// Who an `ExecuteAbility` response is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResponseTarget {
    TriggerSource,
    TriggerTarget,
}

/// What a reaction does to the pending item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactionResponse {
    /// Set the cancelled flag (Shield, Counterspell).
    Cancel,
    /// Scale pending damage down (Uncanny Dodge: 50).
    ReduceDamage { percent: u32 },
    /// Pending damage lands on the reactor instead.
    Redirect,
    /// Run an ability through the effect pipeline (opportunity attack, Hellish Rebuke).
    ExecuteAbility {
        ability: AbilityId,
        target: ResponseTarget,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionDefinition {
    pub id: ReactionId,
    pub name: String,
    pub trigger: TriggerKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub relation: ReactorRelation,
    /// Max distance in tiles from the reactor to the item's source.
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attacks_only: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spells_only: bool,
    pub response: ReactionResponse,
    #[cfg_attr(feature = "serde", serde(default = "ActionCost::reaction"))]
    pub cost: ActionCost,
    /// Ask the decision source; otherwise the reaction fires automatically.
    #[cfg_attr(feature = "serde", serde(default = "default_prompt"))]
    pub prompt: bool,
}

#[cfg(feature = "serde")]
fn default_prompt() -> bool {
    true
}

impl ReactionDefinition {
    pub fn new(id: impl Into<String>, trigger: TriggerKind, response: ReactionResponse) -> Self {
        let id = ReactionId::new(id);
        Self {
            name: id.to_string(),
            id,
            trigger,
            relation: ReactorRelation::ReactorIsTarget,
            range: None,
            attacks_only: false,
            spells_only: false,
            response,
            cost: ActionCost::reaction(),
            prompt: true,
        }
    }
}
