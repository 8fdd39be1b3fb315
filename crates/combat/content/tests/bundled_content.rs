use combat_content::{ContentFactory, ScenarioGenerator, ScenarioLoader};
use combat_core::{
    AbilityId, AlwaysReact, CombatEngine, CombatEnv, CombatantId, DefinitionOracle, Faction,
    InitiativeOrder, OpenGround, PcgRng, TemplateId,
};

#[test]
fn bundled_catalogs_validate_cleanly() {
    let factory = ContentFactory::bundled();
    let registry = factory.load_registry().unwrap();

    assert!(registry.warnings().is_empty(), "{:?}", registry.warnings());
    for ability in combat_content::ADDITIONAL_ABILITIES {
        assert!(
            registry.ability(&AbilityId::new(ability)).is_some(),
            "missing pool ability {ability}"
        );
    }
    assert!(registry.template(&TemplateId::new("adventurer")).is_some());

    let config = factory.load_config().unwrap();
    assert_eq!(config.max_rounds, 50);
    assert_eq!(config.tile_size, 5);
}

#[test]
fn bundled_scenarios_build() {
    let factory = ContentFactory::bundled();
    let registry = factory.load_registry().unwrap();

    let names = factory.scenario_names().unwrap();
    assert_eq!(names, ["duel", "skirmish"]);
    for name in &names {
        let scenario = factory.load_scenario(name).unwrap();
        let combatants = scenario.build(&registry).unwrap();
        assert_eq!(combatants.len(), scenario.units.len());
        assert!(scenario.factions().contains(&Faction::Player));
        assert!(scenario.factions().contains(&Faction::Hostile));
    }

    let skirmish = factory.load_scenario("skirmish").unwrap();
    let combatants = skirmish.build(&registry).unwrap();
    let wizard = &combatants[2];
    assert_eq!((wizard.hp.current, wizard.hp.max), (20, 28));
    let chief = &combatants[5];
    assert_eq!(chief.hp.max, 45);
    assert!(chief.knows(&AbilityId::new("shove")));
    assert!(chief.knows(&AbilityId::new("dash")));
}

#[test]
fn preset_initiative_orders_the_skirmish() {
    let factory = ContentFactory::bundled();
    let registry = factory.load_registry().unwrap();
    let config = factory.load_config().unwrap();
    let scenario = factory.load_scenario("skirmish").unwrap();

    let ground = OpenGround::new();
    let env = CombatEnv::with_all(&registry, &ground, &PcgRng, &config);
    let mut engine = CombatEngine::new(env, scenario.seed.unwrap_or(0), AlwaysReact);
    engine
        .begin_encounter(scenario.build(&registry).unwrap(), InitiativeOrder::Rolled)
        .unwrap();

    let id = |unit: &str| scenario.combatant_id(unit).unwrap();
    assert_eq!(
        engine.state().initiative_order(),
        vec![
            id("goblin_1"),
            id("wizard"),
            id("fighter"),
            id("goblin_2"),
            id("chief"),
            id("cleric"),
        ]
    );
    assert_eq!(engine.state().dice.roll_index, 0);
}

#[test]
fn generated_scenarios_start_encounters() {
    let factory = ContentFactory::bundled();
    let registry = factory.load_registry().unwrap();
    let config = factory.load_config().unwrap();
    let ground = OpenGround::new();

    for seed in 0..16 {
        let scenario = ScenarioGenerator::new(seed).generate();
        let combatants = scenario.build(&registry).unwrap();
        let best = scenario
            .units
            .iter()
            .map(|unit| unit.initiative.unwrap())
            .max()
            .unwrap();

        let env = CombatEnv::with_all(&registry, &ground, &PcgRng, &config);
        let mut engine = CombatEngine::new(env, seed, AlwaysReact);
        engine
            .begin_encounter(combatants, InitiativeOrder::Rolled)
            .unwrap();

        let first = engine.current_actor().unwrap();
        assert_eq!(engine.state().combatant(first).unwrap().initiative, Some(best));
        assert!(engine.state().is_active());
    }
}

#[test]
fn generated_scenario_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed_9.json");
    let scenario = ScenarioGenerator::new(9).generate();
    ScenarioLoader::save(&path, &scenario).unwrap();

    let loaded = ScenarioLoader::load(&path).unwrap();
    assert_eq!(loaded.combatant_id("hostile_2"), Some(CombatantId(4)));
    assert_eq!(loaded, scenario);
}
