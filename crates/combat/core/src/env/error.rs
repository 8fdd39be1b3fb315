//! Collaborator access errors.

use crate::error::{CombatError, ErrorSeverity};

/// A required collaborator was not wired into the [`CombatEnv`](super::CombatEnv).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("DefinitionOracle not available")]
    DefinitionsNotAvailable,

    #[error("SpatialOracle not available")]
    SpatialNotAvailable,

    #[error("RngOracle not available")]
    RngNotAvailable,
}

impl CombatError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            OracleError::DefinitionsNotAvailable => "ORACLE_DEFINITIONS_NOT_AVAILABLE",
            OracleError::SpatialNotAvailable => "ORACLE_SPATIAL_NOT_AVAILABLE",
            OracleError::RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
        }
    }
}
