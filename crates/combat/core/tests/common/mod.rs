//! Shared fixtures for the encounter scenario tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use combat_core::action::{AbilityCategory, AttackSpec, DcFormula, Effect, EffectCondition, SaveSpec};
use combat_core::damage::{AffinityKind, DamageAffinity};
use combat_core::reaction::{ReactionDefinition, ReactionResponse, ReactorRelation, ResponseTarget};
use combat_core::status::{
    AttackRange, RemovalEvent, RemovalPredicate, RemovalTrigger, StackingPolicy, StatusFunctor,
    TickPhase,
};
use combat_core::{
    AbilityDefinition, AbilityId, AbilityScores, ActionCost, AlwaysReact, CombatConfig,
    CombatEngine, CombatEnv, CombatEvent, Combatant, CombatantId, CombatantTemplate, Condition,
    ContentRegistry, DamageType, DerivedStats, DiceExpr, EffectKind, EventKind, Faction,
    ForceDirection, GridPos, InitiativeOrder, OpenGround, PcgRng, RngOracle, StatusDefinition,
    StatusDuration, StatusFlag, StatusId, SurfaceKind, TargetFilter, TargetRule, TemplateId,
    TriggerKind,
};
use combat_core::{Ability, ReactionId};

// ============================================================================
// Dice
// ============================================================================

/// Hands out queued faces in order, then a fixed fallback face.
pub struct ScriptedDice {
    faces: Mutex<VecDeque<u32>>,
    fallback: u32,
}

impl ScriptedDice {
    pub fn new(fallback: u32) -> Self {
        Self {
            faces: Mutex::new(VecDeque::new()),
            fallback,
        }
    }

    pub fn push(&self, faces: &[u32]) {
        self.faces.lock().unwrap().extend(faces.iter().copied());
    }

    pub fn pending(&self) -> usize {
        self.faces.lock().unwrap().len()
    }
}

impl RngOracle for ScriptedDice {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.fallback
    }

    fn roll_die(&self, _seed: u64, sides: u32) -> u32 {
        let face = self.faces.lock().unwrap().pop_front().unwrap_or(self.fallback);
        face.clamp(1, sides.max(1))
    }
}

// ============================================================================
// Content
// ============================================================================

fn ability(
    id: &str,
    category: AbilityCategory,
    cost: ActionCost,
    targeting: TargetRule,
    effects: Vec<Effect>,
) -> AbilityDefinition {
    let mut definition = AbilityDefinition::new(id, cost, targeting);
    definition.category = category;
    definition.effects = effects;
    definition
}

fn dice(notation: &str) -> DiceExpr {
    notation.parse().unwrap()
}

pub fn abilities() -> Vec<AbilityDefinition> {
    let mut longsword = ability(
        "longsword",
        AbilityCategory::Weapon,
        ActionCost::action(),
        TargetRule::single(1, TargetFilter::Enemy),
        vec![Effect::when(
            EffectKind::Damage {
                dice: dice("1d8"),
                damage_type: DamageType::Slashing,
                add_ability_modifier: true,
            },
            EffectCondition::OnHit,
        )],
    );
    longsword.attack = Some(AttackSpec {
        ability: Ability::Strength,
        range: AttackRange::Melee,
        proficient: true,
    });

    let mut fire_bolt = ability(
        "fire_bolt",
        AbilityCategory::Spell,
        ActionCost::action(),
        TargetRule::single(12, TargetFilter::Enemy),
        vec![Effect::when(
            EffectKind::Damage {
                dice: dice("1d10"),
                damage_type: DamageType::Fire,
                add_ability_modifier: false,
            },
            EffectCondition::OnHit,
        )],
    );
    fire_bolt.attack = Some(AttackSpec {
        ability: Ability::Intelligence,
        range: AttackRange::Ranged,
        proficient: true,
    });

    let mut fireball = ability(
        "fireball",
        AbilityCategory::Spell,
        ActionCost::action(),
        TargetRule::area(20, 2),
        vec![Effect::always(EffectKind::Damage {
            dice: dice("8d6"),
            damage_type: DamageType::Fire,
            add_ability_modifier: false,
        })],
    );
    fireball.save = Some(SaveSpec {
        ability: Ability::Dexterity,
        dc: DcFormula::SpellSave,
        half_on_success: true,
    });

    let mut flame_wall = ability(
        "flame_wall",
        AbilityCategory::Spell,
        ActionCost::action(),
        TargetRule::area(12, 0),
        vec![Effect::always(EffectKind::SpawnSurface {
            surface: SurfaceKind::Fire,
            radius: 1,
            lifetime: Some(10),
        })],
    );
    flame_wall.concentration = true;

    let mut searing_snare = ability(
        "searing_snare",
        AbilityCategory::Spell,
        ActionCost::action(),
        TargetRule::single(12, TargetFilter::Enemy),
        vec![
            Effect::when(
                EffectKind::ApplyStatus {
                    status: StatusId::new("restrained"),
                    duration: None,
                },
                EffectCondition::OnFailedSave,
            ),
            Effect::always(EffectKind::SpawnSurface {
                surface: SurfaceKind::Water,
                radius: 0,
                lifetime: None,
            }),
        ],
    );
    searing_snare.concentration = true;
    searing_snare.save = Some(SaveSpec {
        ability: Ability::Dexterity,
        dc: DcFormula::Fixed(13),
        half_on_success: false,
    });

    let ensnare = ability(
        "ensnare",
        AbilityCategory::Class,
        ActionCost::free(),
        TargetRule::single(6, TargetFilter::Enemy),
        vec![Effect::always(EffectKind::ApplyStatus {
            status: StatusId::new("restrained"),
            duration: Some(2),
        })],
    );

    let second_wind = ability(
        "second_wind",
        AbilityCategory::Class,
        ActionCost::bonus_action(),
        TargetRule::self_only(),
        vec![Effect::always(EffectKind::Heal {
            dice: dice("1d10"),
            add_ability_modifier: false,
        })],
    );

    let disengage = ability(
        "disengage",
        AbilityCategory::Class,
        ActionCost::bonus_action(),
        TargetRule::self_only(),
        vec![Effect::always(EffectKind::ApplyStatus {
            status: StatusId::new("disengaged"),
            duration: None,
        })],
    );

    let shove = ability(
        "shove",
        AbilityCategory::Class,
        ActionCost::action(),
        TargetRule::single(1, TargetFilter::Enemy),
        vec![Effect::always(EffectKind::ForcedMove {
            distance: 2,
            direction: ForceDirection::Away,
        })],
    );

    let ignite = ability(
        "ignite",
        AbilityCategory::Class,
        ActionCost::free(),
        TargetRule::single(6, TargetFilter::Enemy),
        vec![Effect::always(EffectKind::ApplyStatus {
            status: StatusId::new("burning"),
            duration: None,
        })],
    );

    let free_stride = ability(
        "free_stride",
        AbilityCategory::Class,
        ActionCost::bonus_action(),
        TargetRule::self_only(),
        vec![Effect::always(EffectKind::ApplyStatus {
            status: StatusId::new("freedom"),
            duration: None,
        })],
    );

    vec![
        longsword,
        fire_bolt,
        fireball,
        flame_wall,
        searing_snare,
        ensnare,
        second_wind,
        disengage,
        shove,
        ignite,
        free_stride,
    ]
}

pub fn statuses() -> Vec<StatusDefinition> {
    let mut restrained = StatusDefinition::new("restrained", StatusDuration::Turns(10));
    restrained.conditions = vec![Condition::Restrained];

    let mut prone = StatusDefinition::new("prone", StatusDuration::Permanent);
    prone.conditions = vec![Condition::Prone];

    let mut disengaged = StatusDefinition::new("disengaged", StatusDuration::Turns(1));
    disengaged.flags = vec![StatusFlag::NoOpportunityAttacks];
    disengaged.tick_phase = TickPhase::TurnEnd;

    let mut burning = StatusDefinition::new("burning", StatusDuration::Turns(3));
    burning.stacking = StackingPolicy::Stack { max: 3 };
    burning.tags = vec!["fire".into()];

    let mut fire_ward = StatusDefinition::new("fire_ward", StatusDuration::Permanent);
    fire_ward.affinities = vec![DamageAffinity::new(DamageType::Fire, AffinityKind::Resistant)];

    let mut freedom = StatusDefinition::new("freedom", StatusDuration::Permanent);
    freedom.grants_immunity = vec!["restrained".into()];

    // Ends on the bearer's first attack and leaves a parting shield.
    let mut sanctuary = StatusDefinition::new("sanctuary", StatusDuration::UntilEvent);
    sanctuary.remove_on = vec![RemovalTrigger {
        event: RemovalEvent::AttackMade,
        predicate: RemovalPredicate::Any,
    }];
    sanctuary.on_remove = vec![StatusFunctor::TemporaryHp { dice: dice("5") }];

    vec![restrained, prone, disengaged, burning, fire_ward, freedom, sanctuary]
}

pub fn reactions() -> Vec<ReactionDefinition> {
    let mut opportunity = ReactionDefinition::new(
        "opportunity_attack",
        TriggerKind::MovementLeavesThreatenedArea,
        ReactionResponse::ExecuteAbility {
            ability: AbilityId::new("longsword"),
            target: ResponseTarget::TriggerSource,
        },
    );
    opportunity.relation = ReactorRelation::HostileSource;
    opportunity.prompt = false;

    let mut counterspell = ReactionDefinition::new(
        "counterspell",
        TriggerKind::AbilityDeclared,
        ReactionResponse::Cancel,
    );
    counterspell.relation = ReactorRelation::HostileSource;
    counterspell.spells_only = true;
    counterspell.range = Some(12);
    counterspell.prompt = false;

    let mut shield = ReactionDefinition::new(
        "shield",
        TriggerKind::DamageAboutToApply,
        ReactionResponse::Cancel,
    );
    shield.prompt = false;

    let mut uncanny_dodge = ReactionDefinition::new(
        "uncanny_dodge",
        TriggerKind::DamageAboutToApply,
        ReactionResponse::ReduceDamage { percent: 50 },
    );
    uncanny_dodge.prompt = false;

    let mut interception = ReactionDefinition::new(
        "interception",
        TriggerKind::DamageAboutToApply,
        ReactionResponse::Redirect,
    );
    interception.relation = ReactorRelation::AllyTarget;
    interception.range = Some(1);
    interception.prompt = false;

    vec![opportunity, counterspell, shield, uncanny_dodge, interception]
}

fn template(id: &str, max_hp: u32, scores: AbilityScores, armor_class: i32) -> CombatantTemplate {
    let mut template = CombatantTemplate::new(id, max_hp);
    template.scores = scores;
    template.stats = DerivedStats {
        armor_class,
        ..DerivedStats::default()
    };
    template
}

pub fn templates() -> Vec<CombatantTemplate> {
    let ids = |names: &[&str]| names.iter().map(|n| AbilityId::new(*n)).collect::<Vec<_>>();

    let mut fighter = template("fighter", 30, AbilityScores::new(16, 12, 14, 10, 10, 10), 16);
    fighter.abilities = ids(&["longsword", "second_wind", "disengage", "shove", "ensnare"]);
    fighter.reactions = vec![ReactionId::new("opportunity_attack")];
    fighter.save_proficiencies = vec![Ability::Strength, Ability::Constitution];
    fighter.death_saves = true;

    let mut mage = template("mage", 20, AbilityScores::new(8, 14, 10, 16, 12, 10), 12);
    mage.spellcasting = Some(Ability::Intelligence);
    mage.abilities = ids(&["fire_bolt", "fireball", "flame_wall", "searing_snare"]);
    mage.reactions = vec![ReactionId::new("counterspell")];

    let mut goblin = template("goblin", 12, AbilityScores::new(10, 14, 10, 10, 8, 8), 13);
    goblin.abilities = ids(&["longsword"]);
    goblin.reactions = vec![ReactionId::new("opportunity_attack")];

    let mut salamander = template("salamander", 40, AbilityScores::default(), 12);
    salamander.affinities = vec![
        DamageAffinity::new(DamageType::Fire, AffinityKind::Resistant),
        DamageAffinity::new(DamageType::Fire, AffinityKind::Resistant),
    ];
    salamander.passives = vec![StatusId::new("fire_ward")];

    let mut elemental = template("fire_elemental", 30, AbilityScores::default(), 13);
    elemental.affinities = vec![DamageAffinity::new(DamageType::Fire, AffinityKind::Immune)];

    let mut ogre = template("ogre", 59, AbilityScores::new(19, 8, 16, 5, 7, 7), 11);
    ogre.abilities = ids(&["longsword"]);

    vec![fighter, mage, goblin, salamander, elemental, ogre]
}

pub fn registry() -> ContentRegistry {
    let mut registry = ContentRegistry::new();
    for status in statuses() {
        registry.add_status(status).unwrap();
    }
    for definition in abilities() {
        registry.add_ability(definition).unwrap();
    }
    for reaction in reactions() {
        registry.add_reaction(reaction).unwrap();
    }
    for template in templates() {
        registry.add_template(template).unwrap();
    }
    registry.validate().unwrap();
    registry
}

// ============================================================================
// Fixture
// ============================================================================

/// Content, open ground, and dice for one test.
pub struct Fixture {
    pub registry: ContentRegistry,
    pub ground: OpenGround,
    pub dice: ScriptedDice,
    pub pcg: PcgRng,
    pub config: CombatConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            registry: registry(),
            ground: OpenGround::new(),
            dice: ScriptedDice::new(10),
            pcg: PcgRng,
            config: CombatConfig::default(),
        }
    }

    /// Engine rolling the scripted dice; prompted reactions are always taken.
    pub fn engine(&self) -> CombatEngine<'_> {
        let env = CombatEnv::with_all(&self.registry, &self.ground, &self.dice, &self.config);
        CombatEngine::new(env, 7, AlwaysReact)
    }

    /// Engine rolling real seeded dice.
    pub fn seeded_engine(&self, seed: u64) -> CombatEngine<'_> {
        let env = CombatEnv::with_all(&self.registry, &self.ground, &self.pcg, &self.config);
        CombatEngine::new(env, seed, AlwaysReact)
    }

    pub fn combatant(&self, id: u32, template: &str, faction: Faction, at: (i32, i32)) -> Combatant {
        let template = self
            .registry
            .templates()
            .find(|t| t.id == TemplateId::new(template))
            .unwrap();
        Combatant::from_template(CombatantId(id), template, faction, GridPos::new(at.0, at.1))
    }
}

/// Starts an encounter with a fixed turn order (listed order).
pub fn begin(engine: &mut CombatEngine<'_>, combatants: Vec<Combatant>) {
    let order = combatants.iter().map(|c| c.id).collect();
    engine
        .begin_encounter(combatants, InitiativeOrder::Explicit(order))
        .unwrap();
}

pub fn count(events: &[CombatEvent], pred: impl Fn(&EventKind) -> bool) -> usize {
    events.iter().filter(|e| pred(&e.kind)).count()
}

pub fn collect(engine: &CombatEngine<'_>) -> Vec<CombatEvent> {
    engine.events().cloned().collect()
}

pub fn hp(engine: &CombatEngine<'_>, id: u32) -> u32 {
    engine.state().combatant(CombatantId(id)).unwrap().hp.current
}
