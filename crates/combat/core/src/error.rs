//! Common error infrastructure for combat-core.
//!
//! Domain errors live next to the code that raises them (`ValidationError` in
//! the action pipeline, `ConfigurationError` in the content registry, and so
//! on). This module provides the shared classification used to decide how a
//! caller should react:
//!
//! - **Configuration** problems are fatal and surface before combat starts.
//! - **Validation** failures are recoverable; state is left untouched and the
//!   caller picks another action.
//! - Invariant violations have no error variant at all. They are ruled out by
//!   construction (exhaustive matches, atomic budget checks, the cancellation
//!   gate on the resolution stack).

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The command was legal in shape but not right now (no resources, blocked by a status).
    Recoverable,

    /// The command referenced something that does not exist or cannot be targeted.
    Validation,

    /// State inconsistency that points at an engine bug.
    Internal,

    /// Missing collaborator or broken content; the encounter cannot run.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if the caller can simply try a different command.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Common trait for all combat-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity by recoverability, not by gameplay impact
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for this error variant, used by tests and log filters.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
