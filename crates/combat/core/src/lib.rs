//! Deterministic turn-based tactical combat rules.
//!
//! `combat-core` owns the rules of one encounter: dice and d20 checks, the
//! damage pipeline, statuses and conditions, the per-turn action economy,
//! the ordered effect pipeline, reaction windows on a resolution stack,
//! concentration, surfaces, and the initiative queue. All mutation flows
//! through [`engine::CombatEngine`]; content, geometry, dice, and reaction
//! choices come from the collaborators in [`env`].
pub mod action;
mod concentration;
pub mod config;
pub mod damage;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod reaction;
pub mod roll;
pub mod state;
pub mod status;
pub mod surface;
pub mod turn;

pub use action::{
    AbilityCategory, AbilityDefinition, ActionBudget, ActionCost, AttackOutcome, AttackSpec,
    Cooldown, DcFormula, Effect, EffectCondition, EffectKind, EffectOutcome, ForceDirection,
    HitOutcome, MovementOutcome, ResourceKind, SaveOutcome, SaveSpec, TargetFilter, TargetRule,
    TargetSelection, TargetShape, ValidationError,
};
pub use config::CombatConfig;
pub use damage::{AffinityKind, DamageAffinity, DamagePacket, DamageReport, DamageType, FinalDamage};
pub use engine::{CombatEngine, EngineError};
pub use env::{
    AlwaysReact, CombatEnv, ConfigurationError, ContentRegistry, DecisionSource, DefinitionOracle,
    NeverReact, OpenGround, OracleError, PcgRng, RngOracle, SpatialOracle, compute_seed,
};
pub use error::{CombatError, ErrorSeverity};
pub use event::{
    CombatEvent, ConcentrationEnd, EventKind, EventSubscriber, HookModifier, RuleHook, RuleWindow,
    SubscriptionId, Topic, WindowKind,
};
pub use reaction::{
    ReactionDecision, ReactionDefinition, ReactionOffer, ReactionResponse, ReactorRelation,
    ResponseTarget, TriggerKind,
};
pub use roll::{AdvantageState, DiceExpr, RollCheck, RollResult};
#[cfg(feature = "serde")]
pub use state::{EncounterSnapshot, SnapshotError};
pub use state::{
    Ability, AbilityId, AbilityScores, CombatState, Combatant, CombatantId, CombatantSnapshot,
    CombatantTemplate, DerivedStats, EncounterPhase, EndReason, Faction, GridPos, HitPoints,
    LifeState, ReactionId, StatusId, TemplateId,
};
pub use status::{
    ActionBlock, Component, Condition, RemovalReason, StatusDefinition, StatusDuration, StatusFlag,
    StatusFunctor, TickPhase,
};
pub use surface::SurfaceKind;
pub use turn::InitiativeOrder;
