//! Data-driven combat content and loaders.
//!
//! This crate turns data files into the read-only inputs of `combat-core`:
//! - Ability, status, reaction, and combatant template definitions (RON)
//! - Engine tunables (TOML)
//! - Encounter scenarios (JSON)
//!
//! It also generates seeded random 2v2 scenarios for smoke runs and balance
//! sweeps. Content never appears in encounter state; the engine only keeps ids.

pub mod generator;
pub mod scenario;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use generator::{ADDITIONAL_ABILITIES, BASE_ABILITY, ScenarioGenerator, assign_role_tags};
pub use scenario::{Scenario, ScenarioError, UnitSpec};

#[cfg(feature = "loaders")]
pub use loaders::{
    Catalog, ConfigLoader, ContentFactory, DefinitionLoader, LoadResult, ScenarioLoader,
};
