mod common;

use combat_core::{
    AbilityId, CombatError, CombatantId, Condition, ConcentrationEnd, EventKind, Faction, GridPos,
    RemovalReason, StatusId, TargetSelection,
};

use common::{Fixture, begin, collect, count, hp};

#[test]
fn reapplying_a_refresh_status_keeps_one_instance() {
    let fx = Fixture::new();
    let mut engine = fx.engine();
    begin(
        &mut engine,
        vec![
            fx.combatant(1, "fighter", Faction::Player, (0, 0)),
            fx.combatant(2, "goblin", Faction::Hostile, (2, 0)),
        ],
    );

    for _ in 0..2 {
        engine
            .execute_ability(CombatantId(1), &"ensnare".into(), TargetSelection::single(CombatantId(2)))
            .unwrap();
    }

    let goblin = engine.snapshot(CombatantId(2)).unwrap();
    assert_eq!(goblin.statuses.len(), 1);
    assert_eq!(goblin.statuses[0].status, StatusId::new("restrained"));
    assert!(goblin.conditions.contains(&Condition::Restrained));

    let events = collect(&engine);
    let refreshed: Vec<bool> = events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::StatusApplied { refreshed, .. } => Some(*refreshed),
            _ => None,
        })
        .collect();
    assert_eq!(refreshed, vec![false, true]);
}

#[test]
fn restrained_combatant_cannot_move() {
    let fx = Fixture::new();
    let mut engine = fx.engine();
    begin(
        &mut engine,
        vec![
            fx.combatant(1, "fighter", Faction::Player, (0, 0)),
            fx.combatant(2, "goblin", Faction::Hostile, (3, 0)),
        ],
    );
    engine
        .execute_ability(CombatantId(1), &"ensnare".into(), TargetSelection::single(CombatantId(2)))
        .unwrap();
    engine.end_turn(CombatantId(1)).unwrap();

    let err = engine
        .execute_movement(CombatantId(2), &[GridPos::new(4, 0)])
        .unwrap_err();
    assert_eq!(err.error_code(), "MOVE_CANNOT_MOVE");
}

#[test]
fn failed_concentration_save_ends_linked_status_and_surface() {
    let fx = Fixture::new();
    let mut engine = fx.engine();
    begin(
        &mut engine,
        vec![
            fx.combatant(1, "mage", Faction::Player, (0, 0)),
            fx.combatant(2, "goblin", Faction::Hostile, (1, 0)),
        ],
    );

    // DEX save: 2 + 2 misses DC 13.
    fx.dice.push(&[2]);
    engine
        .execute_ability(CombatantId(1), &"searing_snare".into(), TargetSelection::single(CombatantId(2)))
        .unwrap();
    assert!(engine.snapshot(CombatantId(1)).unwrap().concentration.is_some());
    assert_eq!(engine.state().surfaces.len(), 1);
    engine.end_turn(CombatantId(1)).unwrap();

    // Restrained attacker rolls twice (15, 15) and hits AC 12; 1d8 rolls 8;
    // concentration save: 3 misses DC 10.
    fx.dice.push(&[15, 15, 8, 3]);
    engine
        .execute_ability(CombatantId(2), &"longsword".into(), TargetSelection::single(CombatantId(1)))
        .unwrap();
    assert_eq!(hp(&engine, 1), 12);

    let events = collect(&engine);
    assert!(events.iter().any(|e| matches!(
        e.kind,
        EventKind::ConcentrationBroken {
            caster: CombatantId(1),
            reason: ConcentrationEnd::FailedSave,
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e.kind,
        EventKind::StatusRemoved {
            target: CombatantId(2),
            reason: RemovalReason::Concentration,
            ..
        }
    )));
    assert_eq!(
        count(&events, |k| matches!(k, EventKind::SurfaceRemoved { .. })),
        1
    );

    assert!(engine.snapshot(CombatantId(2)).unwrap().statuses.is_empty());
    assert!(engine.snapshot(CombatantId(1)).unwrap().concentration.is_none());
    assert!(engine.state().surfaces.is_empty());
}

#[test]
fn new_concentration_replaces_the_old_one() {
    let fx = Fixture::new();
    let mut engine = fx.engine();
    begin(
        &mut engine,
        vec![
            fx.combatant(1, "mage", Faction::Player, (0, 0)),
            fx.combatant(2, "goblin", Faction::Hostile, (6, 0)),
        ],
    );

    engine
        .execute_ability(CombatantId(1), &"flame_wall".into(), TargetSelection::Point(GridPos::new(3, 3)))
        .unwrap();
    assert_eq!(engine.state().surfaces.len(), 9);
    engine.end_turn(CombatantId(1)).unwrap();
    engine.end_turn(CombatantId(2)).unwrap();

    fx.dice.push(&[2]);
    engine
        .execute_ability(CombatantId(1), &"searing_snare".into(), TargetSelection::single(CombatantId(2)))
        .unwrap();

    let events = collect(&engine);
    assert!(events.iter().any(|e| matches!(
        e.kind,
        EventKind::ConcentrationBroken {
            reason: ConcentrationEnd::Replaced,
            ..
        }
    )));
    // The old wall is gone; only the snare's water remains.
    assert_eq!(engine.state().surfaces.len(), 1);
    assert_eq!(
        engine.snapshot(CombatantId(1)).unwrap().concentration,
        Some(AbilityId::new("searing_snare"))
    );
}

#[test]
fn immune_target_blocks_the_status() {
    let fx = Fixture::new();
    let mut goblin = fx.combatant(2, "goblin", Faction::Hostile, (2, 0));
    goblin.status_immunities = vec!["restrained".into()];
    let mut engine = fx.engine();
    begin(
        &mut engine,
        vec![fx.combatant(1, "fighter", Faction::Player, (0, 0)), goblin],
    );

    engine
        .execute_ability(CombatantId(1), &"ensnare".into(), TargetSelection::single(CombatantId(2)))
        .unwrap();

    let events = collect(&engine);
    assert!(events.iter().any(|e| matches!(
        &e.kind,
        EventKind::StatusBlocked { status, target: CombatantId(2) } if *status == StatusId::new("restrained")
    )));
    assert_eq!(count(&events, |k| matches!(k, EventKind::StatusApplied { .. })), 0);
    assert!(engine.snapshot(CombatantId(2)).unwrap().statuses.is_empty());
}

#[test]
fn gaining_immunity_purges_existing_statuses() {
    let fx = Fixture::new();
    let goblin = fx
        .combatant(2, "goblin", Faction::Hostile, (2, 0))
        .with_abilities([AbilityId::new("free_stride")]);
    let mut engine = fx.engine();
    begin(
        &mut engine,
        vec![fx.combatant(1, "fighter", Faction::Player, (0, 0)), goblin],
    );

    engine
        .execute_ability(CombatantId(1), &"ensnare".into(), TargetSelection::single(CombatantId(2)))
        .unwrap();
    engine.end_turn(CombatantId(1)).unwrap();
    engine
        .execute_ability(CombatantId(2), &"free_stride".into(), TargetSelection::None)
        .unwrap();

    let events = collect(&engine);
    assert!(events.iter().any(|e| matches!(
        &e.kind,
        EventKind::StatusRemoved { status, reason: RemovalReason::Immunity, .. }
            if *status == StatusId::new("restrained")
    )));
    let goblin = engine.snapshot(CombatantId(2)).unwrap();
    assert!(!goblin.conditions.contains(&Condition::Restrained));
    let held: Vec<StatusId> = goblin.statuses.iter().map(|s| s.status.clone()).collect();
    assert_eq!(held, vec![StatusId::new("freedom")]);
}

#[test]
fn until_event_status_runs_its_parting_functors_before_leaving() {
    let fx = Fixture::new();
    let mut fighter = fx.combatant(1, "fighter", Faction::Player, (0, 0));
    fighter.passives.push(StatusId::new("sanctuary"));
    let mut engine = fx.engine();
    begin(
        &mut engine,
        vec![fighter, fx.combatant(2, "goblin", Faction::Hostile, (1, 0))],
    );

    // d20 10 + 5 hits AC 13; 1d8 rolls 1, +3 STR.
    fx.dice.push(&[10, 1]);
    engine
        .execute_ability(CombatantId(1), &"longsword".into(), TargetSelection::single(CombatantId(2)))
        .unwrap();

    assert_eq!(hp(&engine, 2), 8);
    let fighter = engine.snapshot(CombatantId(1)).unwrap();
    assert_eq!(fighter.hp.temp, 5);
    assert!(fighter.statuses.is_empty());

    let events = collect(&engine);
    let granted = events
        .iter()
        .position(|e| matches!(e.kind, EventKind::TempHpGranted { target: CombatantId(1), amount: 5 }))
        .unwrap();
    let removed = events
        .iter()
        .position(|e| matches!(
            &e.kind,
            EventKind::StatusRemoved { status, reason: RemovalReason::UntilEvent, .. }
                if *status == StatusId::new("sanctuary")
        ))
        .unwrap();
    assert!(granted < removed);
}

#[test]
fn stacking_status_caps_at_max_stacks() {
    let fx = Fixture::new();
    let fighter = fx
        .combatant(1, "fighter", Faction::Player, (0, 0))
        .with_abilities([AbilityId::new("ignite")]);
    let mut engine = fx.engine();
    begin(
        &mut engine,
        vec![fighter, fx.combatant(2, "goblin", Faction::Hostile, (2, 0))],
    );

    for _ in 0..4 {
        engine
            .execute_ability(CombatantId(1), &"ignite".into(), TargetSelection::single(CombatantId(2)))
            .unwrap();
    }

    let applied: Vec<(u8, bool)> = collect(&engine)
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::StatusApplied { stacks, refreshed, .. } => Some((*stacks, *refreshed)),
            _ => None,
        })
        .collect();
    assert_eq!(applied, vec![(1, false), (2, true), (3, true), (3, true)]);

    let goblin = engine.snapshot(CombatantId(2)).unwrap();
    assert_eq!(goblin.statuses.len(), 1);
    assert_eq!(goblin.statuses[0].status, StatusId::new("burning"));
    assert_eq!(goblin.statuses[0].stacks, 3);
}
