//! Attack rolls and saving throws.

use crate::action::{AbilityDefinition, AttackSpec, DcFormula};
use crate::engine::{CombatContext, EngineError};
use crate::event::{EventKind, RuleWindow, WindowKind};
use crate::roll::{AdvantageTally, Modifier, ModifierSource, RollCheck, RollResult};
use crate::state::{Ability, CombatantId};
use crate::status::{ConditionSet, StatusFlag};

use super::{AttackOutcome, HitOutcome};

impl CombatContext<'_, '_> {
    /// Adds hook contributions for `window` to `check`.
    fn with_hook_modifiers(&self, mut check: RollCheck, window: &RuleWindow<'_>) -> Result<RollCheck, EngineError> {
        let definitions = self.definitions()?;
        for modifier in self.hooks.collect(window, self.state, definitions) {
            if modifier.flat != 0 {
                check = check.with_modifier(Modifier::bonus(modifier.label.clone(), modifier.flat));
            }
            if let Some(dice) = modifier.dice {
                check = check.with_bonus_dice(ModifierSource::Bonus, modifier.label, dice);
            }
        }
        Ok(check)
    }

    /// Flat bonus damage contributed by hooks at the damage window.
    pub fn hook_damage_bonus(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        definition: &AbilityDefinition,
    ) -> Result<i32, EngineError> {
        let definitions = self.definitions()?;
        let window = RuleWindow {
            kind: WindowKind::BeforeDamage,
            actor,
            target: Some(target),
            ability: Some(&definition.id),
            save_ability: None,
        };
        let modifiers = self.hooks.collect(&window, self.state, definitions);
        let mut bonus = 0;
        for modifier in modifiers {
            bonus += modifier.flat;
            if let Some(dice) = modifier.dice {
                bonus += self.roll_dice(&dice)?.total;
            }
        }
        Ok(bonus)
    }

    /// d20 + ability + proficiency + hooks against the target's armor class.
    pub fn attack_roll(
        &mut self,
        attacker: CombatantId,
        target: CombatantId,
        definition: &AbilityDefinition,
        spec: &AttackSpec,
    ) -> Result<AttackOutcome, EngineError> {
        let definitions = self.definitions()?;
        let attacker_record = self.combatant(attacker)?;
        let target_record = self.combatant(target)?;
        let melee = attacker_record.position.distance(target_record.position) <= 1;
        let ability_mod = attacker_record.modifier(spec.ability);
        let proficiency = attacker_record.stats.proficiency;

        let effects = ConditionSet::attack_effects(
            self.state.conditions_of(attacker, definitions),
            self.state.conditions_of(target, definitions),
            spec.range,
            melee,
        );
        let mut tally = AdvantageTally::new();
        tally.add(effects.advantage, effects.disadvantage);
        if self.state.has_flag(attacker, StatusFlag::AttacksHaveAdvantage, definitions) {
            tally.advantage();
        }
        if self.state.has_flag(target, StatusFlag::AttackersHaveDisadvantage, definitions) {
            tally.disadvantage();
        }

        let mut check = RollCheck::d20()
            .with_modifier(Modifier::ability(spec.ability.to_string(), ability_mod))
            .with_advantage(tally.net());
        if spec.proficient {
            check = check.with_modifier(Modifier::proficiency(proficiency));
        }
        let window = RuleWindow {
            kind: WindowKind::BeforeAttackRoll,
            actor: attacker,
            target: Some(target),
            ability: Some(&definition.id),
            save_ability: None,
        };
        let check = self.with_hook_modifiers(check, &window)?;

        let roll = self.roll_check(check)?;
        let armor_class = self.state.armor_class_of(target, definitions);
        let outcome = if roll.is_natural_one() {
            HitOutcome::Miss
        } else if roll.is_natural_max() {
            HitOutcome::Critical
        } else if roll.total >= armor_class {
            if effects.auto_crit {
                HitOutcome::Critical
            } else {
                HitOutcome::Hit
            }
        } else {
            HitOutcome::Miss
        };

        self.emit(EventKind::AttackRolled {
            attacker,
            target,
            ability: definition.id.clone(),
            roll: roll.clone(),
            armor_class,
            hit: outcome.is_hit(),
            critical: outcome == HitOutcome::Critical,
        });
        Ok(AttackOutcome {
            target,
            roll,
            armor_class,
            outcome,
        })
    }

    /// Resolves the save DC an ability imposes.
    pub fn save_dc(&self, caster: CombatantId, formula: DcFormula) -> Result<i32, EngineError> {
        let caster = self.combatant(caster)?;
        Ok(match formula {
            DcFormula::Fixed(dc) => i32::try_from(dc).unwrap_or(i32::MAX),
            DcFormula::SpellSave => caster.spell_save_dc(),
            DcFormula::Ability(ability) => 8 + caster.stats.proficiency + caster.modifier(ability),
        })
    }

    /// Rolls a save and publishes it. `roll` is `None` on an automatic failure.
    pub fn roll_save(
        &mut self,
        saver: CombatantId,
        ability: Ability,
        dc: i32,
        source: Option<CombatantId>,
    ) -> Result<(bool, Option<RollResult>), EngineError> {
        let definitions = self.definitions()?;
        let effects = self
            .state
            .conditions_of(saver, definitions)
            .saving_throw_effects(ability);
        if effects.auto_fail {
            self.emit(EventKind::SavingThrowRolled {
                combatant: saver,
                ability,
                dc,
                roll: None,
                success: false,
            });
            return Ok((false, None));
        }

        let record = self.combatant(saver)?;
        let mut check = RollCheck::d20()
            .with_modifier(Modifier::ability(ability.to_string(), record.modifier(ability)));
        if record.save_proficiencies.contains(&ability) {
            check = check.with_modifier(Modifier::proficiency(record.stats.proficiency));
        }
        let mut tally = AdvantageTally::new();
        tally.add(0, effects.disadvantage);
        let window = RuleWindow {
            kind: WindowKind::BeforeSavingThrow,
            actor: saver,
            target: source,
            ability: None,
            save_ability: Some(ability),
        };
        let check = self.with_hook_modifiers(check.with_advantage(tally.net()), &window)?;

        let roll = self.roll_check(check)?;
        let success = roll.total >= dc;
        self.emit(EventKind::SavingThrowRolled {
            combatant: saver,
            ability,
            dc,
            roll: Some(roll.clone()),
            success,
        });
        Ok((success, Some(roll)))
    }

    pub fn saving_throw(
        &mut self,
        saver: CombatantId,
        ability: Ability,
        dc: i32,
        source: Option<CombatantId>,
    ) -> Result<bool, EngineError> {
        Ok(self.roll_save(saver, ability, dc, source)?.0)
    }
}
