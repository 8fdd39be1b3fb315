//! Trigger windows: offering reactions against a pending stack item.

use std::collections::BTreeSet;

use crate::action::{ExecutionMode, ResourceKind, TargetSelection};
use crate::engine::{CombatContext, EngineError};
use crate::event::EventKind;
use crate::state::{CombatantId, ReactionId};
use crate::status::{ActionBlock, StatusFlag};

use super::{
    PendingEffect, PendingItem, ReactionDecision, ReactionDefinition, ReactionOffer,
    ReactionResponse, ReactorRelation, ResolutionItem, ResponseTarget,
};

impl CombatContext<'_, '_> {
    /// Pushes `item`, runs its trigger window, and pops it back off.
    pub fn open_window(
        &mut self,
        item: PendingItem<PendingEffect>,
    ) -> Result<ResolutionItem<PendingEffect>, EngineError> {
        let seq = self.stack.push(item);
        let outcome = self.run_trigger(seq);
        let popped = self.stack.pop();
        outcome?;
        match popped {
            Some(item) if item.seq == seq => Ok(item),
            _ => Err(EngineError::StackUnbalanced(seq)),
        }
    }

    /// Offers reactions against stack item `seq` until nobody eligible is left
    /// or the item is cancelled.
    ///
    /// Eligibility is re-evaluated after every resolved reaction. Each reactor
    /// sees each of its reactions at most once per trigger and takes at most
    /// one of them.
    fn run_trigger(&mut self, seq: u64) -> Result<(), EngineError> {
        if self.depth >= self.env.config().max_reaction_depth {
            self.warn_data(format!(
                "reaction chain depth {} reached; trigger window skipped",
                self.depth
            ));
            return Ok(());
        }
        let definitions = self.definitions()?;
        let mut offered: BTreeSet<(CombatantId, ReactionId)> = BTreeSet::new();
        let mut reacted: BTreeSet<CombatantId> = BTreeSet::new();

        loop {
            let Some(item) = self.stack.get(seq) else {
                break;
            };
            if item.is_cancelled() {
                break;
            }
            let trigger = item.kind;
            let Some((reactor, reaction)) = self.next_eligible(item, &offered, &reacted)? else {
                break;
            };
            let Some(definition) = definitions.reaction(&reaction) else {
                break;
            };
            offered.insert((reactor, reaction.clone()));

            let offer = ReactionOffer {
                reactor,
                reaction: reaction.clone(),
                trigger,
                source: item.payload().source(),
                target: item.payload().target(),
            };
            let decision = if definition.prompt {
                self.decisions.decide_reaction(&offer, self.state)
            } else {
                ReactionDecision::Use
            };
            tracing::debug!(%reactor, %reaction, %trigger, ?decision, "reaction offered");

            if decision == ReactionDecision::Decline {
                self.emit(EventKind::ReactionDeclined { reactor, reaction });
                continue;
            }
            if self
                .combatant_mut(reactor)?
                .budget
                .consume(&definition.cost)
                .is_err()
            {
                continue;
            }
            reacted.insert(reactor);
            self.emit(EventKind::ReactionTriggered {
                reactor,
                reaction: reaction.clone(),
                trigger,
            });
            self.apply_response(seq, reactor, definition)?;
            self.emit(EventKind::ReactionResolved { reactor, reaction });
        }
        Ok(())
    }

    /// First `(reactor, reaction)` in initiative order that may respond to `item`.
    fn next_eligible(
        &self,
        item: &ResolutionItem<PendingEffect>,
        offered: &BTreeSet<(CombatantId, ReactionId)>,
        reacted: &BTreeSet<CombatantId>,
    ) -> Result<Option<(CombatantId, ReactionId)>, EngineError> {
        let definitions = self.definitions()?;
        for reactor in self.state.initiative_order() {
            if reacted.contains(&reactor) {
                continue;
            }
            let Some(combatant) = self.state.combatant(reactor) else {
                continue;
            };
            for reaction in &combatant.reactions {
                if offered.contains(&(reactor, reaction.clone())) {
                    continue;
                }
                let Some(definition) = definitions.reaction(reaction) else {
                    continue;
                };
                if definition.trigger == item.kind && self.is_eligible(reactor, definition, item)? {
                    return Ok(Some((reactor, reaction.clone())));
                }
            }
        }
        Ok(None)
    }

    fn is_eligible(
        &self,
        reactor: CombatantId,
        definition: &ReactionDefinition,
        item: &ResolutionItem<PendingEffect>,
    ) -> Result<bool, EngineError> {
        let definitions = self.definitions()?;
        let Some(combatant) = self.state.combatant(reactor) else {
            return Ok(false);
        };
        if !self.can_act(reactor)?
            || self
                .state
                .blocking_status(reactor, ActionBlock::Reactions, definitions)
                .is_some()
            || combatant.budget.remaining(&ResourceKind::Reaction) == 0
            || combatant.budget.can_afford(&definition.cost).is_err()
        {
            return Ok(false);
        }

        let payload = item.payload();
        if (definition.attacks_only && !payload.is_attack())
            || (definition.spells_only && !payload.is_spell())
        {
            return Ok(false);
        }

        let source = payload.source();
        let target = payload.target();
        let faction_of = |id: CombatantId| self.state.combatant(id).map(|c| c.faction);
        let relation_holds = match definition.relation {
            ReactorRelation::ReactorIsTarget => target == Some(reactor),
            ReactorRelation::HostileSource => source.is_some_and(|s| {
                s != reactor && faction_of(s).is_some_and(|f| f.is_hostile_to(combatant.faction))
            }),
            ReactorRelation::AllyTarget => target.is_some_and(|t| {
                t != reactor && faction_of(t).is_some_and(|f| f.is_allied_with(combatant.faction))
            }),
            ReactorRelation::Any => source != Some(reactor),
        };
        if !relation_holds {
            return Ok(false);
        }

        if let Some(range) = definition.range {
            let other = match definition.relation {
                ReactorRelation::AllyTarget => target,
                _ => source,
            };
            let in_range = other
                .and_then(|id| self.state.combatant(id))
                .is_none_or(|c| c.position.distance(combatant.position) <= range);
            if !in_range {
                return Ok(false);
            }
        }

        if let PendingEffect::Movement { mover, from, to } = payload {
            let leaves_reach = combatant.position.distance(*from) <= 1
                && combatant.position.distance(*to) > 1;
            if !leaves_reach
                || self
                    .state
                    .has_flag(*mover, StatusFlag::NoOpportunityAttacks, definitions)
            {
                return Ok(false);
            }
        }

        if let ReactionResponse::ExecuteAbility { ability, target } = &definition.response {
            let Some(response_target) = response_target(*target, payload) else {
                return Ok(false);
            };
            let selection = TargetSelection::single(response_target);
            if self
                .validate(reactor, ability, &selection, ExecutionMode::Reaction)
                .is_err()
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn apply_response(
        &mut self,
        seq: u64,
        reactor: CombatantId,
        definition: &ReactionDefinition,
    ) -> Result<(), EngineError> {
        let Some(item) = self.stack.get_mut(seq) else {
            return Ok(());
        };
        match &definition.response {
            ReactionResponse::Cancel => {
                item.cancel();
                let trigger = item.kind;
                self.emit(EventKind::ItemCancelled { trigger, seq });
            }
            ReactionResponse::ReduceDamage { percent } => {
                item.modify(|payload| {
                    if let PendingEffect::Damage { packet, .. } = payload {
                        packet.reduce_by_percent(*percent);
                    }
                });
            }
            ReactionResponse::Redirect => {
                item.modify(|payload| {
                    if let PendingEffect::Damage { target, .. } = payload {
                        *target = reactor;
                    }
                });
                item.target = Some(reactor);
            }
            ReactionResponse::ExecuteAbility { ability, target } => {
                let Some(response_target) = response_target(*target, item.payload()) else {
                    return Ok(());
                };
                self.depth += 1;
                let result = self.execute_ability_in(
                    reactor,
                    ability,
                    TargetSelection::single(response_target),
                    ExecutionMode::Reaction,
                );
                self.depth -= 1;
                match result {
                    Ok(_) => {}
                    Err(EngineError::Validation(err)) => {
                        // Refund: the response never ran.
                        let budget = &mut self.combatant_mut(reactor)?.budget;
                        for (resource, amount) in definition.cost.entries() {
                            budget.restore(&resource, amount);
                        }
                        self.warn_data(format!(
                            "reaction '{}' of {reactor} could not use '{ability}': {err}",
                            definition.id
                        ));
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(())
    }
}

fn response_target(target: ResponseTarget, payload: &PendingEffect) -> Option<CombatantId> {
    match target {
        ResponseTarget::TriggerSource => payload.source(),
        ResponseTarget::TriggerTarget => payload.target(),
    }
}
