//! Rule-of-thumb AI for headless encounters.
//!
//! The [`Autopilot`] plans a whole turn in three layers, cheapest first:
//!
//! 1. **Recover**: a bloodied combatant spends a self-heal if it has one.
//! 2. **Support**: a healer patches up the most wounded ally in reach.
//! 3. **Strike**: otherwise it closes on the nearest enemy and uses the
//!    ability with the best expected damage, then any bonus-action strike.
//!
//! It also answers reaction prompts, holding back the last charge of a
//! resource its own heals need while an ally is hurt.

use combat_core::{
    AbilityDefinition, ActionCost, CombatState, Combatant, CombatantId, Condition, Cooldown,
    DecisionSource, DefinitionOracle, EffectKind, GridPos, LifeState, ReactionDecision,
    ReactionOffer, ResourceKind, TargetFilter, TargetSelection, TargetShape,
};

use crate::planner::{TurnCommand, TurnPlanner};

/// HP percentage at or below which a combatant counts as bloodied.
pub const BLOODIED_PERCENT: u32 = 50;

/// Utility planner and reaction policy over a content catalog.
#[derive(Clone, Copy)]
pub struct Autopilot<'a> {
    definitions: &'a dyn DefinitionOracle,
    tile_size: u32,
}

impl<'a> Autopilot<'a> {
    /// `tile_size` is the movement cost of one tile, as in `CombatConfig`.
    pub fn new(definitions: &'a dyn DefinitionOracle, tile_size: u32) -> Self {
        Self {
            definitions,
            tile_size: tile_size.max(1),
        }
    }

    /// Known abilities the combatant could pay for and is not waiting on.
    fn ready_abilities(&self, me: &Combatant) -> Vec<&'a AbilityDefinition> {
        let definitions = self.definitions;
        me.known_abilities
            .iter()
            .filter_map(|id| definitions.ability(id))
            .filter(|definition| is_ready(me, definition))
            .collect()
    }

    /// Most wounded ally (or self) a heal can reach from `from`.
    fn pick_patient(
        &self,
        me: &Combatant,
        state: &CombatState,
        heal: &AbilityDefinition,
        from: GridPos,
    ) -> Option<CombatantId> {
        state
            .combatants
            .values()
            .filter(|c| c.id == me.id || me.faction.is_allied_with(c.faction))
            .filter(|c| needs_healing(c))
            .filter(|c| from.distance(c.position) <= heal.targeting.range)
            .min_by_key(|c| (hp_percent(c), c.id))
            .map(|c| c.id)
    }

    /// Cells toward `goal` until within `reach`, out of movement, or blocked.
    fn approach(
        &self,
        me: &Combatant,
        state: &CombatState,
        goal: GridPos,
        reach: u32,
    ) -> Vec<GridPos> {
        let conditions = state.conditions_of(me.id, self.definitions);
        if conditions.speed_is_zero() {
            return Vec::new();
        }
        let mut movement = me.budget.remaining(&ResourceKind::Movement);
        if conditions.has(Condition::Prone) {
            movement = movement.saturating_sub(me.stats.speed / 2);
        }
        let steps = (movement / self.tile_size) as usize;

        let mut path = Vec::new();
        let mut at = me.position;
        while path.len() < steps && at.distance(goal) > reach {
            let diagonal = at.step_toward(goal);
            let candidates = [
                diagonal,
                GridPos::new(diagonal.x, at.y),
                GridPos::new(at.x, diagonal.y),
            ];
            let next = candidates.into_iter().find(|&cell| {
                cell != at
                    && cell.distance(goal) < at.distance(goal)
                    && state.combatant_at(cell).is_none()
            });
            let Some(next) = next else {
                break;
            };
            path.push(next);
            at = next;
        }
        path
    }
}

impl TurnPlanner for Autopilot<'_> {
    fn plan_turn(&self, actor: CombatantId, state: &CombatState) -> Vec<TurnCommand> {
        let Some(me) = state.combatant(actor) else {
            tracing::warn!(%actor, "asked to plan for an unknown combatant");
            return Vec::new();
        };
        if !me.is_alive() {
            return Vec::new();
        }

        let ready = self.ready_abilities(me);
        let mut plan = Plan::default();
        let mut position = me.position;

        // Layer 1: Recover
        if needs_healing(me)
            && let Some(heal) = ready.iter().find(|definition| {
                definition.targeting.shape == TargetShape::SelfOnly
                    && heals(definition)
                    && plan.can_pay(&definition.cost)
            })
        {
            tracing::debug!(%actor, ability = %heal.id, "recovering");
            plan.use_ability(heal, TargetSelection::None);
        }

        // Layer 2: Support
        let support = ready.iter().find_map(|definition| {
            let targetable = matches!(definition.targeting.shape, TargetShape::Single)
                && matches!(definition.targeting.filter, TargetFilter::Ally | TargetFilter::Any);
            if !targetable || !heals(definition) || !plan.can_pay(&definition.cost) {
                return None;
            }
            self.pick_patient(me, state, definition, position)
                .map(|patient| (*definition, patient))
        });
        if let Some((heal, patient)) = support {
            tracing::debug!(%actor, ability = %heal.id, %patient, "healing ally");
            plan.use_ability(heal, TargetSelection::single(patient));
        }

        // Layer 3: Strike
        let Some(target) = nearest_enemy(me, state) else {
            tracing::debug!(%actor, "no enemies left standing");
            return plan.commands;
        };
        let strikes: Vec<&AbilityDefinition> =
            ready.iter().copied().filter(|d| is_strike(d)).collect();
        let main: Vec<&AbilityDefinition> = strikes
            .iter()
            .copied()
            .filter(|d| d.cost.action > 0)
            .collect();

        if plan.action_free && !main.is_empty() {
            if best_in_reach(&main, position, target.position).is_none() {
                let reach = main
                    .iter()
                    .map(|d| d.targeting.range)
                    .max()
                    .unwrap_or(1);
                let path = self.approach(me, state, target.position, reach);
                if let Some(&last) = path.last() {
                    tracing::debug!(
                        %actor,
                        target = %target.id,
                        steps = path.len(),
                        "closing distance"
                    );
                    position = last;
                    plan.commands.push(TurnCommand::Move { path });
                }
            }
            if let Some(strike) = best_in_reach(&main, position, target.position) {
                tracing::debug!(%actor, ability = %strike.id, target = %target.id, "striking");
                plan.use_ability(strike, TargetSelection::single(target.id));
            }
        }

        let bonus: Vec<&AbilityDefinition> = strikes
            .iter()
            .copied()
            .filter(|d| d.cost.action == 0 && d.cost.bonus_action > 0)
            .collect();
        if plan.bonus_free
            && let Some(strike) = best_in_reach(&bonus, position, target.position)
        {
            plan.use_ability(strike, TargetSelection::single(target.id));
        }

        if plan.commands.is_empty() {
            tracing::debug!(%actor, "nothing useful to do, passing");
        }
        plan.commands
    }
}

impl DecisionSource for Autopilot<'_> {
    fn decide_reaction(&mut self, offer: &ReactionOffer, state: &CombatState) -> ReactionDecision {
        let Some(reactor) = state.combatant(offer.reactor) else {
            return ReactionDecision::Decline;
        };
        let Some(reaction) = self.definitions.reaction(&offer.reaction) else {
            tracing::warn!(reaction = %offer.reaction, "offered an unknown reaction, declining");
            return ReactionDecision::Decline;
        };

        for (resource, amount) in reaction.cost.entries() {
            let ResourceKind::Custom(name) = &resource else {
                continue;
            };
            let left = reactor.budget.remaining(&resource).saturating_sub(amount);
            if left == 0 && self.saving_for_heal(reactor, state, name) {
                tracing::debug!(
                    reactor = %offer.reactor,
                    reaction = %offer.reaction,
                    resource = %name,
                    "holding the last charge for healing"
                );
                return ReactionDecision::Decline;
            }
        }

        tracing::debug!(
            reactor = %offer.reactor,
            reaction = %offer.reaction,
            trigger = %offer.trigger,
            "taking reaction"
        );
        ReactionDecision::Use
    }
}

impl Autopilot<'_> {
    /// True when the reactor heals with `resource` and someone on its side is hurt.
    fn saving_for_heal(&self, reactor: &Combatant, state: &CombatState, resource: &str) -> bool {
        let heals_with_it = reactor
            .known_abilities
            .iter()
            .filter_map(|id| self.definitions.ability(id))
            .any(|definition| heals(definition) && definition.cost.custom.contains_key(resource));
        heals_with_it
            && state.combatants.values().any(|c| {
                (c.id == reactor.id || reactor.faction.is_allied_with(c.faction))
                    && needs_healing(c)
            })
    }
}

/// Budget the plan has not spent yet.
struct Plan {
    commands: Vec<TurnCommand>,
    action_free: bool,
    bonus_free: bool,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            action_free: true,
            bonus_free: true,
        }
    }
}

impl Plan {
    fn can_pay(&self, cost: &ActionCost) -> bool {
        (cost.action == 0 || self.action_free) && (cost.bonus_action == 0 || self.bonus_free)
    }

    fn use_ability(&mut self, definition: &AbilityDefinition, targets: TargetSelection) {
        if definition.cost.action > 0 {
            self.action_free = false;
        }
        if definition.cost.bonus_action > 0 {
            self.bonus_free = false;
        }
        self.commands
            .push(TurnCommand::ability(definition.id.clone(), targets));
    }
}

fn is_ready(me: &Combatant, definition: &AbilityDefinition) -> bool {
    if me.budget.can_afford(&definition.cost).is_err() {
        return false;
    }
    let usage = me.usage.get(&definition.id);
    if usage.is_some_and(|usage| usage.cooldown > 0) {
        return false;
    }
    match definition.cooldown {
        Cooldown::Charges(charges) => usage.map_or(0, |usage| usage.charges_used) < charges,
        Cooldown::None | Cooldown::Turns(_) => true,
    }
}

fn heals(definition: &AbilityDefinition) -> bool {
    definition
        .effects
        .iter()
        .any(|effect| matches!(effect.kind, EffectKind::Heal { .. }))
}

/// Single-target harmful ability that can be pointed at an enemy.
fn is_strike(definition: &AbilityDefinition) -> bool {
    definition.is_harmful()
        && matches!(definition.targeting.shape, TargetShape::Single | TargetShape::Multi)
        && !matches!(definition.targeting.filter, TargetFilter::Ally)
}

/// Average damage of every damage effect, doubled to stay in integers.
fn expected_damage(definition: &AbilityDefinition) -> i64 {
    definition
        .effects
        .iter()
        .map(|effect| match &effect.kind {
            EffectKind::Damage { dice, .. } => {
                i64::from(dice.count) * (i64::from(dice.sides) + 1) + 2 * i64::from(dice.modifier)
            }
            _ => 0,
        })
        .sum()
}

fn best_in_reach<'d>(
    options: &[&'d AbilityDefinition],
    from: GridPos,
    target: GridPos,
) -> Option<&'d AbilityDefinition> {
    let distance = from.distance(target);
    options
        .iter()
        .copied()
        .filter(|d| distance <= d.targeting.range)
        .max_by(|a, b| {
            expected_damage(a)
                .cmp(&expected_damage(b))
                .then_with(|| b.id.cmp(&a.id))
        })
}

fn nearest_enemy<'s>(me: &Combatant, state: &'s CombatState) -> Option<&'s Combatant> {
    state
        .combatants
        .values()
        .filter(|c| c.is_alive() && me.faction.is_hostile_to(c.faction))
        .min_by_key(|c| (me.position.distance(c.position), c.hp.current, c.id))
}

fn needs_healing(combatant: &Combatant) -> bool {
    match combatant.life {
        LifeState::Downed(_) => true,
        LifeState::Alive => hp_percent(combatant) <= BLOODIED_PERCENT,
        _ => false,
    }
}

fn hp_percent(combatant: &Combatant) -> u32 {
    if combatant.hp.max == 0 {
        return 0;
    }
    combatant.hp.current * 100 / combatant.hp.max
}
