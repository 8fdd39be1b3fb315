//! Status definitions, live instances, and condition rules.

mod condition;
mod definition;
mod instance;
mod lifecycle;
mod registry;

pub use condition::{AttackConditions, AttackRange, Condition, ConditionSet, SaveConditions};
pub use definition::{
    ActionBlock, Component, RemovalEvent, RemovalPredicate, RemovalTrigger, RollBonus, RollTarget,
    StackingPolicy, StatusDefinition, StatusDuration, StatusFlag, StatusFunctor, TickPhase,
};
pub use instance::{RemovalReason, StatusInstance};
pub use lifecycle::{ApplyOutcome, StatusApplication};
pub use registry::{ApplyPlan, StatusRegistry};
