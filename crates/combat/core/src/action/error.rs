//! Recoverable command rejections.
//!
//! A `ValidationError` is always returned before any state is touched, so the
//! caller can pick a different command against the same state.

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{AbilityId, CombatantId, GridPos, StatusId};
use crate::status::ActionBlock;

use super::ResourceShortfall;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("combatant {0} not found")]
    ActorNotFound(CombatantId),

    #[error("target {0} not found")]
    TargetNotFound(CombatantId),

    #[error("it is not {actor}'s turn")]
    NotActorsTurn {
        actor: CombatantId,
        current: Option<CombatantId>,
    },

    #[error("{0} is incapacitated")]
    ActorIncapacitated(CombatantId),

    #[error("{0} is down or dead")]
    ActorDown(CombatantId),

    #[error("ability '{0}' is not defined")]
    UnknownAbility(AbilityId),

    #[error("{actor} does not know '{ability}'")]
    AbilityNotKnown {
        actor: CombatantId,
        ability: AbilityId,
    },

    #[error("not enough {}: need {}, have {}", .0.resource, .0.required, .0.available)]
    InsufficientResources(ResourceShortfall),

    #[error("'{status}' prevents this ({block:?})")]
    BlockedByStatus { status: StatusId, block: ActionBlock },

    #[error("'{ability}' is on cooldown for {turns} more turn(s)")]
    OnCooldown { ability: AbilityId, turns: u32 },

    #[error("'{0}' has no charges left")]
    NoCharges(AbilityId),

    #[error("target {target} is {distance} tiles away (range {range})")]
    OutOfRange {
        target: CombatantId,
        distance: u32,
        range: u32,
    },

    #[error("point {point} is {distance} tiles away (range {range})")]
    PointOutOfRange {
        point: GridPos,
        distance: u32,
        range: u32,
    },

    #[error("no line of sight to {0}")]
    NoLineOfSight(CombatantId),

    #[error("no line of sight to {0}")]
    NoLineOfSightToPoint(GridPos),

    #[error("expected 1..={max} targets, got {got}")]
    InvalidTargetCount { max: u32, got: usize },

    #[error("{target} cannot be targeted: {reason}")]
    InvalidTarget {
        target: CombatantId,
        reason: &'static str,
    },

    #[error("this ability needs a target selection of a different kind")]
    WrongSelection,

    #[error("{actor} is charmed by {target} and cannot harm it")]
    Charmed {
        actor: CombatantId,
        target: CombatantId,
    },

    #[error("path is empty")]
    EmptyPath,

    #[error("path step into {0} is not legal")]
    IllegalPath(GridPos),

    #[error("{0} cannot move")]
    CannotMove(CombatantId),

    #[error("no encounter is running")]
    EncounterNotActive,

    #[error("the encounter is over")]
    EncounterOver,
}

impl CombatError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        use ValidationError::*;
        match self {
            // Legal request, wrong moment: try something else.
            NotActorsTurn { .. }
            | ActorIncapacitated(_)
            | ActorDown(_)
            | InsufficientResources(_)
            | BlockedByStatus { .. }
            | OnCooldown { .. }
            | NoCharges(_)
            | OutOfRange { .. }
            | PointOutOfRange { .. }
            | NoLineOfSight(_)
            | NoLineOfSightToPoint(_)
            | Charmed { .. }
            | CannotMove(_)
            | EncounterOver => ErrorSeverity::Recoverable,

            ActorNotFound(_)
            | TargetNotFound(_)
            | UnknownAbility(_)
            | AbilityNotKnown { .. }
            | InvalidTargetCount { .. }
            | InvalidTarget { .. }
            | WrongSelection
            | EmptyPath
            | IllegalPath(_)
            | EncounterNotActive => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use ValidationError::*;
        match self {
            ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            TargetNotFound(_) => "ACTION_TARGET_NOT_FOUND",
            NotActorsTurn { .. } => "ACTION_NOT_ACTORS_TURN",
            ActorIncapacitated(_) => "ACTION_ACTOR_INCAPACITATED",
            ActorDown(_) => "ACTION_ACTOR_DOWN",
            UnknownAbility(_) => "ACTION_UNKNOWN_ABILITY",
            AbilityNotKnown { .. } => "ACTION_ABILITY_NOT_KNOWN",
            InsufficientResources(_) => "ACTION_INSUFFICIENT_RESOURCES",
            BlockedByStatus { .. } => "ACTION_BLOCKED_BY_STATUS",
            OnCooldown { .. } => "ACTION_ON_COOLDOWN",
            NoCharges(_) => "ACTION_NO_CHARGES",
            OutOfRange { .. } => "ACTION_OUT_OF_RANGE",
            PointOutOfRange { .. } => "ACTION_POINT_OUT_OF_RANGE",
            NoLineOfSight(_) | NoLineOfSightToPoint(_) => "ACTION_NO_LINE_OF_SIGHT",
            InvalidTargetCount { .. } => "ACTION_INVALID_TARGET_COUNT",
            InvalidTarget { .. } => "ACTION_INVALID_TARGET",
            WrongSelection => "ACTION_WRONG_SELECTION",
            Charmed { .. } => "ACTION_CHARMED",
            EmptyPath => "MOVE_EMPTY_PATH",
            IllegalPath(_) => "MOVE_ILLEGAL_PATH",
            CannotMove(_) => "MOVE_CANNOT_MOVE",
            EncounterNotActive => "ENCOUNTER_NOT_ACTIVE",
            EncounterOver => "ENCOUNTER_OVER",
        }
    }
}
