mod common;

use combat_core::{
    CombatEngine, CombatEvent, CombatantId, EncounterSnapshot, Faction, TargetSelection,
};

use common::{Fixture, begin};

fn attack(engine: &mut CombatEngine<'_>, actor: u32, target: u32) {
    engine
        .execute_ability(
            CombatantId(actor),
            &"longsword".into(),
            TargetSelection::single(CombatantId(target)),
        )
        .unwrap();
}

/// Commands played after the save point in both runs.
fn play_on(engine: &mut CombatEngine<'_>) {
    engine.end_turn(CombatantId(1)).unwrap();
    attack(engine, 2, 1);
    engine.end_turn(CombatantId(2)).unwrap();
    attack(engine, 1, 2);
}

#[test]
fn restored_encounter_replays_identically() {
    let fx = Fixture::new();
    let mut engine = fx.seeded_engine(0xC0FFEE);
    begin(
        &mut engine,
        vec![
            fx.combatant(1, "fighter", Faction::Player, (0, 0)),
            fx.combatant(2, "ogre", Faction::Hostile, (1, 0)),
        ],
    );
    attack(&mut engine, 1, 2);

    let bytes = engine.save().to_bytes().unwrap();
    let saved_index = engine.state().dice.roll_index;
    assert!(saved_index >= 1);
    let logged = engine.events().count();

    play_on(&mut engine);
    let original: Vec<CombatEvent> = engine.events().skip(logged).cloned().collect();

    let mut resumed = fx.seeded_engine(0xC0FFEE);
    let snapshot = EncounterSnapshot::from_bytes(&bytes).unwrap();
    assert_eq!(snapshot.state.dice.roll_index, saved_index);
    resumed.restore(snapshot);
    assert_eq!(resumed.events().count(), 0);

    play_on(&mut resumed);
    let replayed: Vec<CombatEvent> = resumed.events().cloned().collect();

    assert!(!original.is_empty());
    assert_eq!(original, replayed);
    assert_eq!(
        engine.save().state_hash().unwrap(),
        resumed.save().state_hash().unwrap()
    );
}

#[test]
fn restore_discards_later_progress() {
    let fx = Fixture::new();
    let mut engine = fx.seeded_engine(7);
    begin(
        &mut engine,
        vec![
            fx.combatant(1, "fighter", Faction::Player, (0, 0)),
            fx.combatant(2, "ogre", Faction::Hostile, (1, 0)),
        ],
    );
    let saved = engine.save();

    attack(&mut engine, 1, 2);
    assert_ne!(engine.state(), &saved.state);

    engine.restore(saved.clone());
    assert_eq!(engine.state(), &saved.state);
    assert_eq!(engine.current_actor(), Some(CombatantId(1)));
}
