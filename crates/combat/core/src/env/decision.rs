//! Synchronous answers to reaction prompts.

use crate::reaction::{ReactionDecision, ReactionOffer};
use crate::state::CombatState;

/// Human or AI policy consulted when a prompted reaction becomes available.
pub trait DecisionSource {
    fn decide_reaction(&mut self, offer: &ReactionOffer, state: &CombatState) -> ReactionDecision;
}

/// Takes every reaction it is offered.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysReact;

impl DecisionSource for AlwaysReact {
    fn decide_reaction(&mut self, _offer: &ReactionOffer, _state: &CombatState) -> ReactionDecision {
        ReactionDecision::Use
    }
}

/// Declines everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverReact;

impl DecisionSource for NeverReact {
    fn decide_reaction(&mut self, _offer: &ReactionOffer, _state: &CombatState) -> ReactionDecision {
        ReactionDecision::Decline
    }
}

impl<F> DecisionSource for F
where
    F: FnMut(&ReactionOffer, &CombatState) -> ReactionDecision,
{
    fn decide_reaction(&mut self, offer: &ReactionOffer, state: &CombatState) -> ReactionDecision {
        self(offer, state)
    }
}
