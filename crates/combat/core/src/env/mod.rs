//! External collaborators.
//!
//! The engine reads content through a [`DefinitionOracle`], asks geometry
//! questions through a [`SpatialOracle`], draws dice from an [`RngOracle`],
//! and pauses on a [`DecisionSource`] when a prompted reaction opens.
//! [`CombatEnv`] bundles the read-only ones.

mod decision;
mod definitions;
mod error;
mod registry;
mod rng;
mod spatial;

pub use decision::{AlwaysReact, DecisionSource, NeverReact};
pub use definitions::DefinitionOracle;
pub use error::OracleError;
pub use registry::{ConfigurationError, ContentRegistry};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use spatial::{OpenGround, SpatialOracle};

use crate::config::CombatConfig;

/// Read-only collaborators and tunables for one engine instance.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    definitions: Option<&'a dyn DefinitionOracle>,
    spatial: Option<&'a dyn SpatialOracle>,
    rng: Option<&'a dyn RngOracle>,
    config: &'a CombatConfig,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        definitions: Option<&'a dyn DefinitionOracle>,
        spatial: Option<&'a dyn SpatialOracle>,
        rng: Option<&'a dyn RngOracle>,
        config: &'a CombatConfig,
    ) -> Self {
        Self {
            definitions,
            spatial,
            rng,
            config,
        }
    }

    pub fn with_all(
        definitions: &'a dyn DefinitionOracle,
        spatial: &'a dyn SpatialOracle,
        rng: &'a dyn RngOracle,
        config: &'a CombatConfig,
    ) -> Self {
        Self::new(Some(definitions), Some(spatial), Some(rng), config)
    }

    /// # Errors
    ///
    /// Returns `OracleError::DefinitionsNotAvailable` if none was provided.
    pub fn definitions(&self) -> Result<&'a dyn DefinitionOracle, OracleError> {
        self.definitions.ok_or(OracleError::DefinitionsNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::SpatialNotAvailable` if none was provided.
    pub fn spatial(&self) -> Result<&'a dyn SpatialOracle, OracleError> {
        self.spatial.ok_or(OracleError::SpatialNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if none was provided.
    pub fn rng(&self) -> Result<&'a dyn RngOracle, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    pub fn config(&self) -> &'a CombatConfig {
        self.config
    }
}

impl std::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("definitions", &self.definitions.is_some())
            .field("spatial", &self.spatial.is_some())
            .field("rng", &self.rng.is_some())
            .field("config", self.config)
            .finish()
    }
}
