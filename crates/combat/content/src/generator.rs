//! Seeded random 2v2 scenarios.
//!
//! Two players start on the west side of the field and two hostiles on the
//! east side. Every unit knows [`BASE_ABILITY`] plus one to three picks from
//! [`ADDITIONAL_ABILITIES`]; role tags follow from the picks. The same seed
//! always yields the same scenario.

use combat_core::{AbilityId, Faction, PcgRng, RngOracle, TemplateId, compute_seed};

use crate::scenario::{Scenario, UnitSpec};

pub const BASE_ABILITY: &str = "main_hand_attack";

pub const ADDITIONAL_ABILITIES: [&str; 10] = [
    "ranged_attack",
    "offhand_attack",
    "shove",
    "dash",
    "dodge_action",
    "hide",
    "second_wind",
    "bardic_inspiration",
    "cure_wounds",
    "poison_spray",
];

const PLAYER_NAMES: [&str; 10] = [
    "Aldric", "Brienne", "Cedric", "Delara", "Eldrin", "Fiona", "Gareth", "Helena", "Isadora",
    "Jareth",
];

const HOSTILE_NAMES: [&str; 10] = [
    "Grimfang",
    "Vex",
    "Kragnar",
    "Shadowblade",
    "Malakar",
    "Dreadmaw",
    "Skorn",
    "Nightshade",
    "Razorclaw",
    "Hexbane",
];

/// Keeps generator draws apart from encounter dice sharing the same seed.
const GENERATOR_STREAM: u32 = 0x2_5C3;

const HP_RANGE: (u32, u32) = (35, 80);
const INITIATIVE_RANGE: (u32, u32) = (8, 18);
const TIEBREAKER_RANGE: (u32, u32) = (1, 100);
const ROWS: (i32, i32) = (-2, 2);
const PLAYER_COLUMNS: (i32, i32) = (-5, -3);
const HOSTILE_COLUMNS: (i32, i32) = (3, 5);

/// Role tags implied by a unit's abilities, in first-seen order.
pub fn assign_role_tags(abilities: &[AbilityId]) -> Vec<String> {
    let knows = |name: &str| abilities.iter().any(|ability| ability.as_str() == name);

    let mut tags: Vec<&str> = Vec::new();
    if knows("poison_spray") {
        tags.extend(["melee", "debuffer"]);
    }
    if knows("cure_wounds") {
        tags.extend(["healer", "support"]);
    }
    if knows("ranged_attack") {
        tags.push("ranged");
    }
    if knows("offhand_attack") {
        tags.push("melee");
    }
    if knows("bardic_inspiration") {
        tags.push("support");
    }

    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.iter().any(|seen| seen == tag) {
            unique.push(tag.to_owned());
        }
    }
    unique
}

/// Counter-based draws from the crate's PCG source.
struct Draws {
    seed: u64,
    index: u64,
}

impl Draws {
    fn new(seed: u64) -> Self {
        Self { seed, index: 0 }
    }

    fn next_seed(&mut self) -> u64 {
        let seed = compute_seed(self.seed, self.index, GENERATOR_STREAM, 0);
        self.index += 1;
        seed
    }

    fn range(&mut self, (min, max): (u32, u32)) -> u32 {
        let seed = self.next_seed();
        PcgRng.range(seed, min, max)
    }

    /// `count` distinct items, in draw order (partial Fisher-Yates).
    fn sample<T: Clone>(&mut self, pool: &[T], count: usize) -> Vec<T> {
        let mut items = pool.to_vec();
        let count = count.min(items.len());
        for i in 0..count {
            let j = self.range((i as u32, items.len() as u32 - 1)) as usize;
            items.swap(i, j);
        }
        items.truncate(count);
        items
    }
}

/// Builds random 2v2 scenarios from a seed.
#[derive(Clone, Debug)]
pub struct ScenarioGenerator {
    seed: u64,
    template: TemplateId,
}

impl ScenarioGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            template: TemplateId::new(UnitSpec::DEFAULT_TEMPLATE),
        }
    }

    /// Template every generated unit is built from.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = TemplateId::new(template);
        self
    }

    pub fn generate(&self) -> Scenario {
        let mut draws = Draws::new(self.seed);

        let player_names = draws.sample(&PLAYER_NAMES, 2);
        let hostile_names = draws.sample(&HOSTILE_NAMES, 2);

        let mut units = Vec::with_capacity(4);
        for (faction, prefix, names, columns) in [
            (Faction::Player, "player", player_names, PLAYER_COLUMNS),
            (Faction::Hostile, "hostile", hostile_names, HOSTILE_COLUMNS),
        ] {
            let cells = draws.sample(&block(columns, ROWS), names.len());
            for (number, (name, (x, y))) in names.into_iter().zip(cells).enumerate() {
                let id = format!("{prefix}_{}", number + 1);
                units.push(self.unit(&mut draws, id, name, faction, x, y));
            }
        }

        tracing::debug!(seed = self.seed, "generated random 2v2 scenario");
        Scenario {
            id: format!("random_2v2_seed_{}", self.seed),
            name: format!("Random 2v2 (Seed {})", self.seed),
            seed: Some(self.seed),
            units,
        }
    }

    fn unit(
        &self,
        draws: &mut Draws,
        id: String,
        name: &str,
        faction: Faction,
        x: i32,
        y: i32,
    ) -> UnitSpec {
        let extra = draws.range((1, 3)) as usize;
        let mut abilities = vec![AbilityId::new(BASE_ABILITY)];
        abilities.extend(
            draws
                .sample(&ADDITIONAL_ABILITIES, extra)
                .into_iter()
                .map(AbilityId::new),
        );

        let hp = draws.range(HP_RANGE);
        let initiative = draws.range(INITIATIVE_RANGE) as i32;
        let tiebreaker = draws.range(TIEBREAKER_RANGE) as i32;

        let mut unit = UnitSpec::new(id, name, faction).at(x, y);
        unit.template = self.template.clone();
        unit.hp = Some(hp);
        unit.max_hp = Some(hp);
        unit.initiative = Some(initiative);
        unit.initiative_tiebreaker = tiebreaker;
        unit.tags = assign_role_tags(&abilities);
        unit.abilities = abilities;
        unit
    }
}

/// Every cell of a rectangular block, row-major.
fn block(columns: (i32, i32), rows: (i32, i32)) -> Vec<(i32, i32)> {
    (rows.0..=rows.1)
        .flat_map(|y| (columns.0..=columns.1).map(move |x| (x, y)))
        .collect()
}
