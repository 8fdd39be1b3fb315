//! Action economy, ability data, and the effect pipeline.

mod ability;
mod budget;
mod effect;
mod error;
mod execute;
mod targeting;

pub use ability::{AbilityCategory, AbilityDefinition, AttackSpec, Cooldown, DcFormula, SaveSpec};
pub use budget::{ActionBudget, ActionCost, Counter, ResourceKind, ResourceShortfall};
pub use effect::{Effect, EffectCondition, EffectKind, ForceDirection};
pub use error::ValidationError;
pub use execute::{
    AttackOutcome, EffectOutcome, ExecutionMode, HitOutcome, MovementOutcome, SaveOutcome,
};
pub use targeting::{TargetFilter, TargetRule, TargetSelection, TargetShape};
