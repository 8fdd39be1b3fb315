//! Interrupt windows: triggers, the resolution stack, and reaction data.

mod definition;
mod stack;
mod trigger;
mod window;

pub use definition::{ReactionDefinition, ReactionResponse, ReactorRelation, ResponseTarget};
pub use stack::{PendingItem, Resolution, ResolutionItem, ResolutionStack};
pub use trigger::{DamageOrigin, PendingEffect, ReactionDecision, ReactionOffer, TriggerKind};
