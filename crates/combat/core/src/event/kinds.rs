use crate::action::ResourceKind;
use crate::damage::FinalDamage;
use crate::reaction::TriggerKind;
use crate::roll::RollResult;
use crate::state::{
    Ability, AbilityId, CombatantId, EndReason, Faction, GridPos, ReactionId, StatusId,
    StatusInstanceId,
};
use crate::status::RemovalReason;
use crate::surface::SurfaceKind;

/// Subscription channel an event is delivered on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topic {
    /// Rolls, damage, healing, movement, surfaces, life and death.
    Combat,
    Status,
    Reaction,
    /// Encounter, round, and turn boundaries.
    Turn,
    /// Data-integrity warnings.
    Diagnostics,
}

/// Why a concentration effect ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConcentrationEnd {
    FailedSave,
    /// The caster started concentrating on something else.
    Replaced,
    Incapacitated,
    /// The caster dropped to 0 HP.
    Down,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    // ===== turn =====
    EncounterStarted {
        order: Vec<CombatantId>,
    },
    InitiativeRolled {
        combatant: CombatantId,
        score: i32,
    },
    RoundStarted {
        round: u32,
    },
    TurnStarted {
        combatant: CombatantId,
    },
    TurnEnded {
        combatant: CombatantId,
    },
    EncounterEnded {
        winner: Option<Faction>,
        reason: EndReason,
    },

    // ===== combat =====
    AbilityDeclared {
        actor: CombatantId,
        ability: AbilityId,
    },
    AbilityCountered {
        actor: CombatantId,
        ability: AbilityId,
    },
    AbilityResolved {
        actor: CombatantId,
        ability: AbilityId,
    },
    AttackRolled {
        attacker: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        roll: RollResult,
        armor_class: i32,
        hit: bool,
        critical: bool,
    },
    SavingThrowRolled {
        combatant: CombatantId,
        ability: Ability,
        dc: i32,
        roll: Option<RollResult>,
        success: bool,
    },
    DamageDealt {
        source: Option<CombatantId>,
        target: CombatantId,
        damage: FinalDamage,
        absorbed_by_temp: u32,
        hp_after: u32,
    },
    DamageNegated {
        source: Option<CombatantId>,
        target: CombatantId,
    },
    Healed {
        target: CombatantId,
        amount: u32,
        hp_after: u32,
    },
    TempHpGranted {
        target: CombatantId,
        amount: u32,
    },
    ResourceGranted {
        target: CombatantId,
        resource: ResourceKind,
        amount: u32,
    },
    Moved {
        combatant: CombatantId,
        from: GridPos,
        to: GridPos,
        cost: u32,
    },
    ForcedMoved {
        combatant: CombatantId,
        from: GridPos,
        to: GridPos,
    },
    MovementInterrupted {
        combatant: CombatantId,
        at: GridPos,
    },
    SurfaceSpawned {
        position: GridPos,
        surface: SurfaceKind,
        owner: Option<CombatantId>,
    },
    SurfaceTransformed {
        position: GridPos,
        from: SurfaceKind,
        to: SurfaceKind,
    },
    SurfaceExpired {
        position: GridPos,
        surface: SurfaceKind,
    },
    SurfaceRemoved {
        position: GridPos,
        surface: SurfaceKind,
    },
    CombatantDowned {
        combatant: CombatantId,
    },
    DeathSaveRolled {
        combatant: CombatantId,
        natural: u32,
        successes: u8,
        failures: u8,
    },
    CombatantStabilized {
        combatant: CombatantId,
    },
    CombatantRevived {
        combatant: CombatantId,
    },
    CombatantDied {
        combatant: CombatantId,
    },

    // ===== status =====
    StatusApplied {
        instance: StatusInstanceId,
        status: StatusId,
        target: CombatantId,
        source: Option<CombatantId>,
        stacks: u8,
        refreshed: bool,
    },
    StatusBlocked {
        status: StatusId,
        target: CombatantId,
    },
    StatusTicked {
        instance: StatusInstanceId,
        status: StatusId,
        target: CombatantId,
    },
    StatusRemoved {
        instance: StatusInstanceId,
        status: StatusId,
        target: CombatantId,
        reason: RemovalReason,
    },
    ConcentrationStarted {
        caster: CombatantId,
        ability: AbilityId,
    },
    ConcentrationBroken {
        caster: CombatantId,
        ability: AbilityId,
        reason: ConcentrationEnd,
    },

    // ===== reaction =====
    ReactionTriggered {
        reactor: CombatantId,
        reaction: ReactionId,
        trigger: TriggerKind,
    },
    ReactionResolved {
        reactor: CombatantId,
        reaction: ReactionId,
    },
    ReactionDeclined {
        reactor: CombatantId,
        reaction: ReactionId,
    },
    ItemCancelled {
        trigger: TriggerKind,
        seq: u64,
    },

    // ===== diagnostics =====
    DataWarning {
        message: String,
    },
}

impl EventKind {
    pub fn topic(&self) -> Topic {
        use EventKind::*;
        match self {
            EncounterStarted { .. }
            | InitiativeRolled { .. }
            | RoundStarted { .. }
            | TurnStarted { .. }
            | TurnEnded { .. }
            | EncounterEnded { .. } => Topic::Turn,

            AbilityDeclared { .. }
            | AbilityCountered { .. }
            | AbilityResolved { .. }
            | AttackRolled { .. }
            | SavingThrowRolled { .. }
            | DamageDealt { .. }
            | DamageNegated { .. }
            | Healed { .. }
            | TempHpGranted { .. }
            | ResourceGranted { .. }
            | Moved { .. }
            | ForcedMoved { .. }
            | MovementInterrupted { .. }
            | SurfaceSpawned { .. }
            | SurfaceTransformed { .. }
            | SurfaceExpired { .. }
            | SurfaceRemoved { .. }
            | CombatantDowned { .. }
            | DeathSaveRolled { .. }
            | CombatantStabilized { .. }
            | CombatantRevived { .. }
            | CombatantDied { .. } => Topic::Combat,

            StatusApplied { .. }
            | StatusBlocked { .. }
            | StatusTicked { .. }
            | StatusRemoved { .. }
            | ConcentrationStarted { .. }
            | ConcentrationBroken { .. } => Topic::Status,

            ReactionTriggered { .. }
            | ReactionResolved { .. }
            | ReactionDeclined { .. }
            | ItemCancelled { .. } => Topic::Reaction,

            DataWarning { .. } => Topic::Diagnostics,
        }
    }
}

/// A published rule-window event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatEvent {
    pub seq: u64,
    pub round: u32,
    pub kind: EventKind,
}

impl CombatEvent {
    pub fn topic(&self) -> Topic {
        self.kind.topic()
    }
}
