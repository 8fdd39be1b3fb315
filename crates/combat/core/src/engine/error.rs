//! Top-level engine errors.

use crate::action::ValidationError;
use crate::env::OracleError;
use crate::error::{CombatError, ErrorSeverity};
use crate::state::CombatantId;
#[cfg(feature = "serde")]
use crate::state::SnapshotError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[cfg(feature = "serde")]
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("encounter has already started")]
    EncounterAlreadyStarted,

    #[error("an encounter needs at least one combatant")]
    NoCombatants,

    #[error("combatant id {0} appears more than once")]
    DuplicateCombatant(CombatantId),

    #[error("invalid initiative order: {0}")]
    InvalidInitiative(String),

    /// A combatant disappeared from state while an effect referenced it.
    #[error("combatant {0} vanished from state")]
    UnknownCombatant(CombatantId),

    /// A trigger window popped something other than the item it pushed.
    #[error("resolution stack lost item {0}")]
    StackUnbalanced(u64),
}

impl CombatError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Validation(err) => err.severity(),
            EngineError::Oracle(err) => err.severity(),
            #[cfg(feature = "serde")]
            EngineError::Snapshot(err) => err.severity(),
            EngineError::EncounterAlreadyStarted => ErrorSeverity::Recoverable,
            EngineError::NoCombatants
            | EngineError::DuplicateCombatant(_)
            | EngineError::InvalidInitiative(_) => ErrorSeverity::Validation,
            EngineError::UnknownCombatant(_) | EngineError::StackUnbalanced(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            EngineError::Validation(err) => err.error_code(),
            EngineError::Oracle(err) => err.error_code(),
            #[cfg(feature = "serde")]
            EngineError::Snapshot(err) => err.error_code(),
            EngineError::EncounterAlreadyStarted => "ENGINE_ENCOUNTER_ALREADY_STARTED",
            EngineError::NoCombatants => "ENGINE_NO_COMBATANTS",
            EngineError::DuplicateCombatant(_) => "ENGINE_DUPLICATE_COMBATANT",
            EngineError::InvalidInitiative(_) => "ENGINE_INVALID_INITIATIVE",
            EngineError::UnknownCombatant(_) => "ENGINE_UNKNOWN_COMBATANT",
            EngineError::StackUnbalanced(_) => "ENGINE_STACK_UNBALANCED",
        }
    }
}

impl EngineError {
    /// The wrapped validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            EngineError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_their_code() {
        let err = EngineError::from(ValidationError::EncounterOver);
        assert_eq!(err.error_code(), "ENCOUNTER_OVER");
        assert!(err.severity().is_recoverable());
    }

    #[test]
    fn lost_combatant_is_internal() {
        let err = EngineError::UnknownCombatant(CombatantId(4));
        assert_eq!(err.severity(), ErrorSeverity::Internal);
    }
}
