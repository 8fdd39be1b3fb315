//! In-memory content registry with load-time validation.

use std::collections::BTreeMap;

use crate::action::{AbilityDefinition, ActionCost, EffectKind, TargetShape};
use crate::error::{CombatError, ErrorSeverity};
use crate::reaction::{ReactionDefinition, ReactionResponse};
use crate::state::{AbilityId, CombatantTemplate, ReactionId, StatusId, TemplateId};
use crate::status::{StatusDefinition, StatusFunctor};
use crate::surface::SurfaceKind;

use super::DefinitionOracle;

/// Broken content. Raised before any encounter starts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{owner} references unknown status '{status}'")]
    UnknownStatus { owner: String, status: StatusId },

    #[error("{owner} references unknown ability '{ability}'")]
    UnknownAbility { owner: String, ability: AbilityId },

    #[error("{owner} references unknown reaction '{reaction}'")]
    UnknownReaction { owner: String, reaction: ReactionId },

    #[error("{owner} has a malformed cost: {reason}")]
    MalformedCost { owner: String, reason: String },

    #[error("ability '{0}' declares no effects")]
    NoEffects(AbilityId),

    #[error("ability '{0}' must allow at least one target")]
    ZeroTargets(AbilityId),

    #[error("ability '{0}' gates effects on an attack roll it never makes")]
    AttackGateWithoutAttack(AbilityId),

    #[error("ability '{0}' gates effects on a saving throw it never asks for")]
    SaveGateWithoutSave(AbilityId),

    #[error("status '{0}' allows zero stacks")]
    ZeroStacks(StatusId),
}

impl CombatError for ConfigurationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use ConfigurationError::*;
        match self {
            DuplicateId { .. } => "CONFIG_DUPLICATE_ID",
            UnknownStatus { .. } => "CONFIG_UNKNOWN_STATUS",
            UnknownAbility { .. } => "CONFIG_UNKNOWN_ABILITY",
            UnknownReaction { .. } => "CONFIG_UNKNOWN_REACTION",
            MalformedCost { .. } => "CONFIG_MALFORMED_COST",
            NoEffects(_) => "CONFIG_NO_EFFECTS",
            ZeroTargets(_) => "CONFIG_ZERO_TARGETS",
            AttackGateWithoutAttack(_) => "CONFIG_ATTACK_GATE_WITHOUT_ATTACK",
            SaveGateWithoutSave(_) => "CONFIG_SAVE_GATE_WITHOUT_SAVE",
            ZeroStacks(_) => "CONFIG_ZERO_STACKS",
        }
    }
}

/// Definitions keyed by id.
#[derive(Clone, Debug, Default)]
pub struct ContentRegistry {
    abilities: BTreeMap<AbilityId, AbilityDefinition>,
    statuses: BTreeMap<StatusId, StatusDefinition>,
    reactions: BTreeMap<ReactionId, ReactionDefinition>,
    templates: BTreeMap<TemplateId, CombatantTemplate>,
    /// Reported by loaders; survive revalidation.
    load_warnings: Vec<String>,
    warnings: Vec<String>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ability(&mut self, definition: AbilityDefinition) -> Result<(), ConfigurationError> {
        insert_unique(&mut self.abilities, "ability", definition.id.clone(), definition)
    }

    pub fn add_status(&mut self, definition: StatusDefinition) -> Result<(), ConfigurationError> {
        insert_unique(&mut self.statuses, "status", definition.id.clone(), definition)
    }

    pub fn add_reaction(&mut self, definition: ReactionDefinition) -> Result<(), ConfigurationError> {
        insert_unique(&mut self.reactions, "reaction", definition.id.clone(), definition)
    }

    pub fn add_template(&mut self, template: CombatantTemplate) -> Result<(), ConfigurationError> {
        insert_unique(&mut self.templates, "template", template.id.clone(), template)
    }

    pub fn with_ability(mut self, definition: AbilityDefinition) -> Result<Self, ConfigurationError> {
        self.add_ability(definition)?;
        Ok(self)
    }

    pub fn with_status(mut self, definition: StatusDefinition) -> Result<Self, ConfigurationError> {
        self.add_status(definition)?;
        Ok(self)
    }

    pub fn with_reaction(mut self, definition: ReactionDefinition) -> Result<Self, ConfigurationError> {
        self.add_reaction(definition)?;
        Ok(self)
    }

    pub fn with_template(mut self, template: CombatantTemplate) -> Result<Self, ConfigurationError> {
        self.add_template(template)?;
        Ok(self)
    }

    /// Records a soft problem found while reading content.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.load_warnings.push(message.clone());
        self.warnings.push(message);
    }

    pub fn abilities(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.abilities.values()
    }

    pub fn statuses(&self) -> impl Iterator<Item = &StatusDefinition> {
        self.statuses.values()
    }

    pub fn templates(&self) -> impl Iterator<Item = &CombatantTemplate> {
        self.templates.values()
    }

    /// Checks cross references and shapes. Soft problems become warnings.
    pub fn validate(&mut self) -> Result<(), ConfigurationError> {
        for ability in self.abilities.values() {
            self.validate_ability(ability)?;
        }
        for status in self.statuses.values() {
            self.validate_status(status)?;
        }
        for reaction in self.reactions.values() {
            self.validate_reaction(reaction)?;
        }
        for template in self.templates.values() {
            self.validate_template(template)?;
        }
        self.warnings = self
            .load_warnings
            .iter()
            .cloned()
            .chain(self.collect_warnings())
            .collect();
        for warning in &self.warnings {
            tracing::warn!(%warning, "content warning");
        }
        Ok(())
    }

    fn validate_ability(&self, ability: &AbilityDefinition) -> Result<(), ConfigurationError> {
        let owner = format!("ability '{}'", ability.id);
        validate_cost(&owner, &ability.cost)?;
        if ability.effects.is_empty() {
            return Err(ConfigurationError::NoEffects(ability.id.clone()));
        }
        if ability.targeting.max_targets == 0
            && !matches!(
                ability.targeting.shape,
                TargetShape::SelfOnly | TargetShape::Area { .. }
            )
        {
            return Err(ConfigurationError::ZeroTargets(ability.id.clone()));
        }
        if ability.attack.is_none() && ability.uses_attack_gates() {
            return Err(ConfigurationError::AttackGateWithoutAttack(ability.id.clone()));
        }
        if ability.save.is_none() && ability.uses_save_gates() {
            return Err(ConfigurationError::SaveGateWithoutSave(ability.id.clone()));
        }
        for effect in &ability.effects {
            match &effect.kind {
                EffectKind::ApplyStatus { status, .. } | EffectKind::RemoveStatus { status } => {
                    self.require_status(&owner, status)?;
                }
                EffectKind::Damage { .. }
                | EffectKind::Heal { .. }
                | EffectKind::TemporaryHp { .. }
                | EffectKind::ForcedMove { .. }
                | EffectKind::SpawnSurface { .. }
                | EffectKind::GrantResource { .. } => {}
            }
        }
        Ok(())
    }

    fn validate_status(&self, status: &StatusDefinition) -> Result<(), ConfigurationError> {
        if status.max_stacks() == 0 {
            return Err(ConfigurationError::ZeroStacks(status.id.clone()));
        }
        let owner = format!("status '{}'", status.id);
        let functors = status
            .on_apply
            .iter()
            .chain(&status.on_tick)
            .chain(&status.on_remove);
        for functor in functors {
            match functor {
                StatusFunctor::ApplyStatus { status: id, .. }
                | StatusFunctor::RemoveStatus { status: id } => self.require_status(&owner, id)?,
                StatusFunctor::Damage { .. }
                | StatusFunctor::Heal { .. }
                | StatusFunctor::TemporaryHp { .. }
                | StatusFunctor::SavingThrow { .. }
                | StatusFunctor::RestoreResource { .. } => {}
            }
        }
        Ok(())
    }

    fn validate_reaction(&self, reaction: &ReactionDefinition) -> Result<(), ConfigurationError> {
        let owner = format!("reaction '{}'", reaction.id);
        validate_cost(&owner, &reaction.cost)?;
        if reaction.cost.reaction != 1 {
            return Err(ConfigurationError::MalformedCost {
                owner,
                reason: format!("spends {} reactions instead of one", reaction.cost.reaction),
            });
        }
        if let ReactionResponse::ExecuteAbility { ability, .. } = &reaction.response
            && !self.abilities.contains_key(ability)
        {
            return Err(ConfigurationError::UnknownAbility {
                owner,
                ability: ability.clone(),
            });
        }
        Ok(())
    }

    fn validate_template(&self, template: &CombatantTemplate) -> Result<(), ConfigurationError> {
        let owner = format!("template '{}'", template.id);
        for ability in &template.abilities {
            if !self.abilities.contains_key(ability) {
                return Err(ConfigurationError::UnknownAbility {
                    owner,
                    ability: ability.clone(),
                });
            }
        }
        for reaction in &template.reactions {
            if !self.reactions.contains_key(reaction) {
                return Err(ConfigurationError::UnknownReaction {
                    owner,
                    reaction: reaction.clone(),
                });
            }
        }
        for passive in &template.passives {
            self.require_status(&owner, passive)?;
        }
        Ok(())
    }

    fn require_status(&self, owner: &str, status: &StatusId) -> Result<(), ConfigurationError> {
        if self.statuses.contains_key(status) {
            Ok(())
        } else {
            Err(ConfigurationError::UnknownStatus {
                owner: owner.to_owned(),
                status: status.clone(),
            })
        }
    }

    /// Soft issues: immunity tags nothing carries, surfaces pointing at missing statuses.
    fn collect_warnings(&self) -> Vec<String> {
        use strum::IntoEnumIterator;

        let mut warnings = Vec::new();
        let known_tag = |tag: &str| {
            self.statuses
                .values()
                .any(|status| status.id.as_str() == tag || status.tags.iter().any(|t| t == tag))
        };

        for template in self.templates.values() {
            for tag in &template.status_immunities {
                if !known_tag(tag) {
                    warnings.push(format!(
                        "template '{}' is immune to unknown status tag '{tag}'",
                        template.id
                    ));
                }
            }
        }
        for status in self.statuses.values() {
            for tag in &status.grants_immunity {
                if !known_tag(tag) {
                    warnings.push(format!(
                        "status '{}' grants immunity to unknown status tag '{tag}'",
                        status.id
                    ));
                }
            }
        }
        for surface in SurfaceKind::iter() {
            if let Some(save) = surface.entry_save()
                && !self.statuses.contains_key(&StatusId::new(save.status))
            {
                warnings.push(format!(
                    "surface '{surface}' applies missing status '{}'",
                    save.status
                ));
            }
        }
        warnings
    }
}

fn insert_unique<K: Ord + ToString, V>(
    map: &mut BTreeMap<K, V>,
    kind: &'static str,
    key: K,
    value: V,
) -> Result<(), ConfigurationError> {
    if map.contains_key(&key) {
        return Err(ConfigurationError::DuplicateId {
            kind,
            id: key.to_string(),
        });
    }
    map.insert(key, value);
    Ok(())
}

fn validate_cost(owner: &str, cost: &ActionCost) -> Result<(), ConfigurationError> {
    for (name, amount) in &cost.custom {
        if name.trim().is_empty() {
            return Err(ConfigurationError::MalformedCost {
                owner: owner.to_owned(),
                reason: "custom resource with an empty name".into(),
            });
        }
        if *amount == 0 {
            return Err(ConfigurationError::MalformedCost {
                owner: owner.to_owned(),
                reason: format!("custom resource '{name}' costs zero"),
            });
        }
    }
    Ok(())
}

impl DefinitionOracle for ContentRegistry {
    fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(id)
    }

    fn status(&self, id: &StatusId) -> Option<&StatusDefinition> {
        self.statuses.get(id)
    }

    fn reaction(&self, id: &ReactionId) -> Option<&ReactionDefinition> {
        self.reactions.get(id)
    }

    fn template(&self, id: &TemplateId) -> Option<&CombatantTemplate> {
        self.templates.get(id)
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Effect, EffectCondition, TargetRule};
    use crate::damage::DamageType;
    use crate::reaction::TriggerKind;
    use crate::roll::DiceExpr;
    use crate::status::StatusDuration;

    fn strike() -> AbilityDefinition {
        let mut ability =
            AbilityDefinition::new("strike", ActionCost::action(), TargetRule::default());
        ability.effects.push(Effect::always(EffectKind::Damage {
            dice: DiceExpr::new(1, 6, 0),
            damage_type: DamageType::Bludgeoning,
            add_ability_modifier: false,
        }));
        ability
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = ContentRegistry::new();
        registry.add_ability(strike()).unwrap();
        assert!(matches!(
            registry.add_ability(strike()),
            Err(ConfigurationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn unknown_status_reference_is_fatal() {
        let mut ability = strike();
        ability.effects.push(Effect::always(EffectKind::ApplyStatus {
            status: StatusId::new("missing"),
            duration: None,
        }));
        let mut registry = ContentRegistry::new().with_ability(ability).unwrap();
        let err = registry.validate().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_UNKNOWN_STATUS");
        assert!(err.severity().is_fatal());
    }

    #[test]
    fn zero_custom_cost_is_malformed() {
        let mut ability = strike();
        ability.cost = ActionCost::action().with_custom("spell_slot_1", 0);
        let mut registry = ContentRegistry::new().with_ability(ability).unwrap();
        assert!(matches!(
            registry.validate(),
            Err(ConfigurationError::MalformedCost { .. })
        ));
    }

    #[test]
    fn reactions_must_spend_one_reaction() {
        let mut ward = ReactionDefinition::new(
            "ward",
            TriggerKind::DamageAboutToApply,
            ReactionResponse::ReduceDamage { percent: 50 },
        );
        ward.cost = ActionCost::free().with_custom("ward_charge", 1);
        let mut registry = ContentRegistry::new().with_reaction(ward).unwrap();
        let err = registry.validate().unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedCost { .. }));
        assert!(err.to_string().contains("reaction 'ward'"));
    }

    #[test]
    fn hit_gates_need_an_attack() {
        let mut ability = strike();
        ability.effects[0].when = EffectCondition::OnHit;
        let mut registry = ContentRegistry::new().with_ability(ability).unwrap();
        assert!(matches!(
            registry.validate(),
            Err(ConfigurationError::AttackGateWithoutAttack(_))
        ));
    }

    #[test]
    fn loader_warnings_survive_validation() {
        let mut registry = ContentRegistry::new().with_ability(strike()).unwrap();
        registry.add_warning("unknown damage type 'chaos'");
        registry.validate().unwrap();
        registry.validate().unwrap();
        let chaos = registry
            .warnings()
            .iter()
            .filter(|w| w.contains("chaos"))
            .count();
        assert_eq!(chaos, 1);
    }

    #[test]
    fn missing_surface_statuses_are_warnings_not_errors() {
        let mut registry = ContentRegistry::new()
            .with_status(StatusDefinition::new("prone", StatusDuration::UntilEvent))
            .unwrap();
        registry.validate().unwrap();
        assert!(
            registry
                .warnings()
                .iter()
                .any(|w| w.contains("restrained"))
        );
    }
}
