//! Headless simulator entry point.
use anyhow::Result;
use combat_core::{EncounterPhase, LifeState};
use combat_sim::{Session, SimConfig};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env();
    let session = Session::load(&config)?;
    let summary = session.start()?.run()?;

    println!("{} (seed {})", session.scenario().name, session.seed());
    match summary.phase {
        EncounterPhase::Ended {
            winner: Some(faction),
            reason,
        } => println!("{faction} wins ({reason:?}) after {} rounds", summary.rounds),
        EncounterPhase::Ended {
            winner: None,
            reason,
        } => println!("no winner ({reason:?}) after {} rounds", summary.rounds),
        phase => println!("stopped in phase {phase:?}"),
    }
    for combatant in &summary.roster {
        let life = match combatant.life {
            LifeState::Alive => "alive",
            LifeState::Downed(_) => "downed",
            LifeState::Stable => "stable",
            LifeState::Dead => "dead",
        };
        println!(
            "  {:<12} {:<8} {:>3}/{:<3} {}",
            combatant.name, combatant.faction, combatant.hp.current, combatant.hp.max, life
        );
    }
    println!("turns: {}  events: {}", summary.turns, summary.events);
    println!("state hash: {}", summary.state_hash);
    Ok(())
}
