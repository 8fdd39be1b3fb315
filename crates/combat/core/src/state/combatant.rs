//! Combatant records and the template data they are built from.

use std::collections::BTreeMap;

use crate::action::ActionBudget;
use crate::damage::DamageAffinity;

use super::{
    Ability, AbilityId, AbilityScores, CombatantId, Faction, GridPos, ReactionId, StatusId,
    TemplateId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DerivedStats {
    pub armor_class: i32,
    /// Movement units per turn (30 = six 5 ft tiles).
    pub speed: u32,
    pub proficiency: i32,
}

impl Default for DerivedStats {
    fn default() -> Self {
        Self {
            armor_class: 10,
            speed: 30,
            proficiency: 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitPoints {
    pub current: u32,
    pub max: u32,
    pub temp: u32,
}

impl HitPoints {
    pub const fn full(max: u32) -> Self {
        Self {
            current: max,
            max,
            temp: 0,
        }
    }

    /// Temp HP soaks first. Returns `(absorbed_by_temp, hp_lost)`.
    pub fn take(&mut self, amount: u32) -> (u32, u32) {
        let absorbed = amount.min(self.temp);
        self.temp -= absorbed;
        let lost = (amount - absorbed).min(self.current);
        self.current -= lost;
        (absorbed, lost)
    }

    /// Heals up to max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current - before
    }

    /// Temp HP does not stack; the larger pool wins. Returns true if it changed.
    pub fn grant_temp(&mut self, amount: u32) -> bool {
        if amount > self.temp {
            self.temp = amount;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathSaves {
    pub successes: u8,
    pub failures: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifeState {
    #[default]
    Alive,
    /// At 0 HP, rolling death saves. Counts as unconscious.
    Downed(DeathSaves),
    /// At 0 HP, no longer rolling.
    Stable,
    /// Retained for log replay; never acts or is targeted again.
    Dead,
}

impl LifeState {
    pub fn is_alive(self) -> bool {
        matches!(self, LifeState::Alive)
    }

    pub fn is_dead(self) -> bool {
        matches!(self, LifeState::Dead)
    }

    /// Still on the board and able to take damage or healing.
    pub fn is_present(self) -> bool {
        !self.is_dead()
    }
}

/// Active concentration effect of one caster.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcentrationSlot {
    pub ability: AbilityId,
    pub started_round: u32,
}

/// Per-ability cooldown and charge bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityUsage {
    pub cooldown: u32,
    pub charges_used: u32,
}

/// Stat block data a combatant is created from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantTemplate {
    pub id: TemplateId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scores: AbilityScores,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: DerivedStats,
    pub max_hp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub save_proficiencies: Vec<Ability>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spellcasting: Option<Ability>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reactions: Vec<ReactionId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub affinities: Vec<DamageAffinity>,
    /// Status ids or tags this creature cannot be affected by.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status_immunities: Vec<String>,
    /// Permanent statuses applied when the encounter begins.
    #[cfg_attr(feature = "serde", serde(default))]
    pub passives: Vec<StatusId>,
    /// Custom budget pools (spell slots, class charges) and their maximums.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resources: BTreeMap<String, u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub death_saves: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
}

impl CombatantTemplate {
    pub fn new(id: impl Into<String>, max_hp: u32) -> Self {
        let id = TemplateId::new(id);
        Self {
            name: id.to_string(),
            id,
            scores: AbilityScores::default(),
            stats: DerivedStats::default(),
            max_hp,
            save_proficiencies: Vec::new(),
            spellcasting: None,
            abilities: Vec::new(),
            reactions: Vec::new(),
            affinities: Vec::new(),
            status_immunities: Vec::new(),
            passives: Vec::new(),
            resources: BTreeMap::new(),
            death_saves: false,
            tags: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub template: Option<TemplateId>,
    pub faction: Faction,
    pub scores: AbilityScores,
    pub stats: DerivedStats,
    pub save_proficiencies: Vec<Ability>,
    pub spellcasting: Option<Ability>,
    pub hp: HitPoints,
    pub life: LifeState,
    pub budget: ActionBudget,
    pub concentration: Option<ConcentrationSlot>,
    pub known_abilities: Vec<AbilityId>,
    pub reactions: Vec<ReactionId>,
    pub affinities: Vec<DamageAffinity>,
    pub status_immunities: Vec<String>,
    pub passives: Vec<StatusId>,
    pub death_save_eligible: bool,
    pub position: GridPos,
    pub usage: BTreeMap<AbilityId, AbilityUsage>,
    /// Preset initiative score; rolled when absent.
    pub initiative: Option<i32>,
    pub initiative_tiebreaker: i32,
    pub tags: Vec<String>,
}

impl Combatant {
    pub fn from_template(
        id: CombatantId,
        template: &CombatantTemplate,
        faction: Faction,
        position: GridPos,
    ) -> Self {
        let budget = template.resources.iter().fold(
            ActionBudget::standard(template.stats.speed),
            |budget, (name, max)| budget.with_resource(name.clone(), *max),
        );
        Self {
            id,
            name: template.name.clone(),
            template: Some(template.id.clone()),
            faction,
            scores: template.scores,
            stats: template.stats,
            save_proficiencies: template.save_proficiencies.clone(),
            spellcasting: template.spellcasting,
            hp: HitPoints::full(template.max_hp),
            life: LifeState::Alive,
            budget,
            concentration: None,
            known_abilities: template.abilities.clone(),
            reactions: template.reactions.clone(),
            affinities: template.affinities.clone(),
            status_immunities: template.status_immunities.clone(),
            passives: template.passives.clone(),
            death_save_eligible: template.death_saves,
            position,
            usage: BTreeMap::new(),
            initiative: None,
            initiative_tiebreaker: 0,
            tags: template.tags.clone(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides current and maximum HP (scenario files carry their own values).
    pub fn with_hp(mut self, current: u32, max: u32) -> Self {
        self.hp = HitPoints {
            current: current.min(max),
            max,
            temp: 0,
        };
        self
    }

    pub fn with_initiative(mut self, score: i32, tiebreaker: i32) -> Self {
        self.initiative = Some(score);
        self.initiative_tiebreaker = tiebreaker;
        self
    }

    pub fn with_abilities(mut self, abilities: impl IntoIterator<Item = AbilityId>) -> Self {
        for ability in abilities {
            if !self.known_abilities.contains(&ability) {
                self.known_abilities.push(ability);
            }
        }
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        for tag in tags {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.scores.modifier(ability)
    }

    pub fn save_bonus(&self, ability: Ability) -> i32 {
        let proficiency = if self.save_proficiencies.contains(&ability) {
            self.stats.proficiency
        } else {
            0
        };
        self.modifier(ability) + proficiency
    }

    /// `8 + proficiency + spellcasting modifier` (INT when no casting ability is set).
    pub fn spell_save_dc(&self) -> i32 {
        let ability = self.spellcasting.unwrap_or(Ability::Intelligence);
        8 + self.stats.proficiency + self.modifier(ability)
    }

    pub fn knows(&self, ability: &AbilityId) -> bool {
        self.known_abilities.contains(ability)
    }

    pub fn is_alive(&self) -> bool {
        self.life.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_hp_absorbs_first() {
        let mut hp = HitPoints::full(20);
        hp.grant_temp(5);
        assert_eq!(hp.take(8), (5, 3));
        assert_eq!(hp.current, 17);
        assert_eq!(hp.temp, 0);
    }

    #[test]
    fn temp_hp_keeps_the_larger_pool() {
        let mut hp = HitPoints::full(20);
        assert!(hp.grant_temp(6));
        assert!(!hp.grant_temp(4));
        assert_eq!(hp.temp, 6);
    }

    #[test]
    fn healing_caps_at_max() {
        let mut hp = HitPoints {
            current: 15,
            max: 20,
            temp: 0,
        };
        assert_eq!(hp.heal(10), 5);
        assert_eq!(hp.current, 20);
    }

    #[test]
    fn template_builds_budget_with_resources() {
        let mut template = CombatantTemplate::new("wizard", 14);
        template.resources.insert("spell_slot_1".into(), 3);
        template.spellcasting = Some(Ability::Intelligence);
        template.scores.intelligence = 16;

        let combatant =
            Combatant::from_template(CombatantId(1), &template, Faction::Player, GridPos::ORIGIN);
        assert_eq!(
            combatant
                .budget
                .remaining(&crate::action::ResourceKind::Custom("spell_slot_1".into())),
            3
        );
        assert_eq!(combatant.spell_save_dc(), 8 + 2 + 3);
    }
}
