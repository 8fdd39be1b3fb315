mod common;

use combat_core::{CombatEngine, CombatEvent, CombatantId, Faction, LifeState, TargetSelection};

use common::{Fixture, begin};

/// Fighter and goblin trade blows until one side stands alone.
fn duel(fx: &Fixture, seed: u64) -> (Vec<CombatEvent>, CombatEngine<'_>) {
    let mut engine = fx.seeded_engine(seed);
    begin(
        &mut engine,
        vec![
            fx.combatant(1, "fighter", Faction::Player, (0, 0)),
            fx.combatant(2, "goblin", Faction::Hostile, (1, 0)),
        ],
    );

    let mut last_index = engine.state().dice.roll_index;
    for _ in 0..200 {
        if !engine.state().is_active() {
            break;
        }
        let Some(actor) = engine.current_actor() else {
            break;
        };
        let target = if actor == CombatantId(1) { CombatantId(2) } else { CombatantId(1) };
        let alive = engine.snapshot(actor).unwrap().life == LifeState::Alive;
        if alive {
            engine
                .execute_ability(actor, &"longsword".into(), TargetSelection::single(target))
                .unwrap();
        }
        if engine.state().is_active() {
            engine.end_turn(actor).unwrap();
        }

        let index = engine.state().dice.roll_index;
        assert!(index >= last_index);
        last_index = index;
        for id in [1, 2] {
            let hp = engine.snapshot(CombatantId(id)).unwrap().hp;
            assert!(hp.current <= hp.max);
        }
    }
    (engine.events().cloned().collect(), engine)
}

#[test]
fn same_seed_same_fight() {
    let fx = Fixture::new();
    for seed in 0..32 {
        let (first, engine) = duel(&fx, seed);
        let (second, _) = duel(&fx, seed);
        assert_eq!(first, second, "seed {seed} diverged");
        assert!(!engine.state().is_active(), "seed {seed} never finished");
    }
}

#[test]
fn event_sequence_numbers_are_contiguous() {
    let fx = Fixture::new();
    let (events, _) = duel(&fx, 99);
    for (expected, event) in events.iter().enumerate() {
        assert_eq!(event.seq, expected as u64);
    }
}
