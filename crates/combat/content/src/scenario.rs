//! Encounter scenarios: who fights, where they stand, and what they can do.
//!
//! A scenario names units by string id and points each one at a combatant
//! template. [`Scenario::build`] resolves the templates against loaded content
//! and yields engine combatants numbered `1..=n` in file order.

use std::collections::BTreeSet;

use combat_core::{
    AbilityId, CombatError, Combatant, CombatantId, DefinitionOracle, ErrorSeverity, Faction,
    GridPos, TemplateId,
};

/// A scenario that cannot be turned into an encounter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario '{0}' has no units")]
    NoUnits(String),

    #[error("unit id '{0}' appears more than once")]
    DuplicateUnit(String),

    #[error("unit '{unit}' uses unknown template '{template}'")]
    UnknownTemplate { unit: String, template: TemplateId },

    #[error("unit '{unit}' knows unknown ability '{ability}'")]
    UnknownAbility { unit: String, ability: AbilityId },

    #[error("unit '{0}' has zero maximum hit points")]
    ZeroHitPoints(String),

    #[error("units '{first}' and '{second}' both stand at {at}")]
    OverlappingUnits {
        first: String,
        second: String,
        at: GridPos,
    },
}

impl CombatError for ScenarioError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            ScenarioError::NoUnits(_) => "SCENARIO_NO_UNITS",
            ScenarioError::DuplicateUnit(_) => "SCENARIO_DUPLICATE_UNIT",
            ScenarioError::UnknownTemplate { .. } => "SCENARIO_UNKNOWN_TEMPLATE",
            ScenarioError::UnknownAbility { .. } => "SCENARIO_UNKNOWN_ABILITY",
            ScenarioError::ZeroHitPoints(_) => "SCENARIO_ZERO_HIT_POINTS",
            ScenarioError::OverlappingUnits { .. } => "SCENARIO_OVERLAPPING_UNITS",
        }
    }
}

/// One combatant entry in a scenario file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct UnitSpec {
    pub id: String,
    pub name: String,
    pub faction: Faction,
    #[cfg_attr(feature = "serde", serde(default = "UnitSpec::default_template"))]
    pub template: TemplateId,
    /// Current HP; defaults to `max_hp`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hp: Option<u32>,
    /// Overrides the template's maximum.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_hp: Option<u32>,
    /// Preset initiative score; rolled when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initiative: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initiative_tiebreaker: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub x: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub y: i32,
    /// Known on top of the template's own list.
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
}

impl UnitSpec {
    pub const DEFAULT_TEMPLATE: &'static str = "adventurer";

    pub fn new(id: impl Into<String>, name: impl Into<String>, faction: Faction) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            faction,
            template: Self::default_template(),
            hp: None,
            max_hp: None,
            initiative: None,
            initiative_tiebreaker: 0,
            x: 0,
            y: 0,
            abilities: Vec::new(),
            tags: Vec::new(),
        }
    }

    fn default_template() -> TemplateId {
        TemplateId::new(Self::DEFAULT_TEMPLATE)
    }

    pub fn position(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = TemplateId::new(template);
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    pub id: String,
    pub name: String,
    /// Encounter seed; the caller picks one when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
    pub units: Vec<UnitSpec>,
}

impl Scenario {
    /// Engine id of a unit: its 1-based position in the file.
    pub fn combatant_id(&self, unit: &str) -> Option<CombatantId> {
        self.units
            .iter()
            .position(|spec| spec.id == unit)
            .map(|index| CombatantId(index as u32 + 1))
    }

    pub fn factions(&self) -> BTreeSet<Faction> {
        self.units.iter().map(|unit| unit.faction).collect()
    }

    /// Resolves every unit against loaded content.
    ///
    /// # Errors
    ///
    /// Fails on the first unit that references missing content, reuses an id,
    /// or shares a cell with an earlier unit.
    pub fn build(&self, definitions: &dyn DefinitionOracle) -> Result<Vec<Combatant>, ScenarioError> {
        if self.units.is_empty() {
            return Err(ScenarioError::NoUnits(self.id.clone()));
        }

        let mut combatants: Vec<Combatant> = Vec::with_capacity(self.units.len());
        for (index, unit) in self.units.iter().enumerate() {
            if self.units[..index].iter().any(|earlier| earlier.id == unit.id) {
                return Err(ScenarioError::DuplicateUnit(unit.id.clone()));
            }
            if let Some(earlier) = self.units[..index]
                .iter()
                .find(|earlier| earlier.position() == unit.position())
            {
                return Err(ScenarioError::OverlappingUnits {
                    first: earlier.id.clone(),
                    second: unit.id.clone(),
                    at: unit.position(),
                });
            }
            let combatant = build_unit(CombatantId(index as u32 + 1), unit, definitions)?;
            combatants.push(combatant);
        }

        tracing::debug!(scenario = %self.id, units = combatants.len(), "scenario built");
        Ok(combatants)
    }
}

fn build_unit(
    id: CombatantId,
    unit: &UnitSpec,
    definitions: &dyn DefinitionOracle,
) -> Result<Combatant, ScenarioError> {
    let template =
        definitions
            .template(&unit.template)
            .ok_or_else(|| ScenarioError::UnknownTemplate {
                unit: unit.id.clone(),
                template: unit.template.clone(),
            })?;

    if let Some(ability) = unit
        .abilities
        .iter()
        .find(|ability| definitions.ability(ability).is_none())
    {
        return Err(ScenarioError::UnknownAbility {
            unit: unit.id.clone(),
            ability: ability.clone(),
        });
    }

    let max = unit.max_hp.or(unit.hp).unwrap_or(template.max_hp);
    if max == 0 {
        return Err(ScenarioError::ZeroHitPoints(unit.id.clone()));
    }
    let current = unit.hp.unwrap_or(max);

    let mut combatant = Combatant::from_template(id, template, unit.faction, unit.position())
        .with_name(unit.name.clone())
        .with_hp(current, max)
        .with_abilities(unit.abilities.iter().cloned())
        .with_tags(unit.tags.iter().cloned());
    match unit.initiative {
        Some(score) => combatant = combatant.with_initiative(score, unit.initiative_tiebreaker),
        None => combatant.initiative_tiebreaker = unit.initiative_tiebreaker,
    }
    Ok(combatant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{
        AbilityDefinition, ActionCost, CombatantTemplate, ContentRegistry, DamageType, DiceExpr,
        Effect, EffectKind, TargetRule,
    };

    fn registry() -> ContentRegistry {
        let mut strike = AbilityDefinition::new("strike", ActionCost::action(), TargetRule::default());
        strike.effects.push(Effect::always(EffectKind::Damage {
            dice: DiceExpr::new(1, 6, 0),
            damage_type: DamageType::Bludgeoning,
            add_ability_modifier: false,
        }));
        let mut kick = strike.clone();
        kick.id = AbilityId::new("kick");

        let mut adventurer = CombatantTemplate::new("adventurer", 20);
        adventurer.abilities = vec![AbilityId::new("strike")];

        ContentRegistry::new()
            .with_ability(strike)
            .and_then(|r| r.with_ability(kick))
            .and_then(|r| r.with_template(adventurer))
            .unwrap()
    }

    fn scenario(units: Vec<UnitSpec>) -> Scenario {
        Scenario {
            id: "test".into(),
            name: "Test".into(),
            seed: None,
            units,
        }
    }

    #[test]
    fn units_are_numbered_in_file_order() {
        let mut hero = UnitSpec::new("hero", "Aldric", Faction::Player).at(-3, 0);
        hero.hp = Some(12);
        hero.max_hp = Some(40);
        hero.abilities = vec![AbilityId::new("kick"), AbilityId::new("strike")];
        hero.initiative = Some(14);
        hero.initiative_tiebreaker = 7;
        let foe = UnitSpec::new("foe", "Vex", Faction::Hostile).at(3, 0);
        let scenario = scenario(vec![hero, foe]);

        let combatants = scenario.build(&registry()).unwrap();

        assert_eq!(combatants.len(), 2);
        let hero = &combatants[0];
        assert_eq!(hero.id, CombatantId(1));
        assert_eq!(hero.name, "Aldric");
        assert_eq!((hero.hp.current, hero.hp.max), (12, 40));
        assert_eq!(hero.known_abilities, vec![AbilityId::new("strike"), AbilityId::new("kick")]);
        assert_eq!(hero.initiative, Some(14));
        assert_eq!(hero.initiative_tiebreaker, 7);

        let foe = &combatants[1];
        assert_eq!(foe.id, CombatantId(2));
        assert_eq!(foe.hp.max, 20);
        assert_eq!(foe.position, GridPos::new(3, 0));
        assert_eq!(scenario.combatant_id("foe"), Some(CombatantId(2)));
    }

    #[test]
    fn hp_alone_sets_both_current_and_max() {
        let mut unit = UnitSpec::new("solo", "Solo", Faction::Player);
        unit.hp = Some(55);
        let combatants = scenario(vec![unit]).build(&registry()).unwrap();
        assert_eq!((combatants[0].hp.current, combatants[0].hp.max), (55, 55));
    }

    #[test]
    fn broken_units_are_rejected() {
        let registry = registry();

        let err = scenario(Vec::new()).build(&registry).unwrap_err();
        assert_eq!(err.error_code(), "SCENARIO_NO_UNITS");

        let unit = UnitSpec::new("a", "A", Faction::Player).with_template("dragon");
        let err = scenario(vec![unit]).build(&registry).unwrap_err();
        assert_eq!(err.error_code(), "SCENARIO_UNKNOWN_TEMPLATE");

        let mut unit = UnitSpec::new("a", "A", Faction::Player);
        unit.abilities = vec![AbilityId::new("meteor")];
        let err = scenario(vec![unit]).build(&registry).unwrap_err();
        assert_eq!(err.error_code(), "SCENARIO_UNKNOWN_ABILITY");

        let units = vec![
            UnitSpec::new("a", "A", Faction::Player).at(0, 0),
            UnitSpec::new("a", "B", Faction::Hostile).at(1, 0),
        ];
        let err = scenario(units).build(&registry).unwrap_err();
        assert_eq!(err, ScenarioError::DuplicateUnit("a".into()));

        let units = vec![
            UnitSpec::new("a", "A", Faction::Player).at(2, 2),
            UnitSpec::new("b", "B", Faction::Hostile).at(2, 2),
        ];
        let err = scenario(units).build(&registry).unwrap_err();
        assert_eq!(err.error_code(), "SCENARIO_OVERLAPPING_UNITS");

        let mut unit = UnitSpec::new("a", "A", Faction::Player);
        unit.max_hp = Some(0);
        let err = scenario(vec![unit]).build(&registry).unwrap_err();
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.error_code(), "SCENARIO_ZERO_HIT_POINTS");
    }
}
