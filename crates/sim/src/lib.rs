//! Headless encounter simulator.
//!
//! Loads content with `combat-content`, builds an encounter from a scenario
//! file or a seeded random 2v2, and plays it out with the [`Autopilot`]
//! planning every turn and answering every reaction prompt.
pub mod autopilot;
pub mod config;
pub mod planner;
pub mod runner;

pub use autopilot::{Autopilot, BLOODIED_PERCENT};
pub use config::SimConfig;
pub use planner::{PassPlanner, TurnCommand, TurnPlanner};
pub use runner::{EncounterRunner, RunSummary, Session, SimError, SimResult, TurnReport};
