//! Flat roll modifiers and their deterministic application order.

/// Where a modifier comes from. The declaration order is the application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierSource {
    /// Ability score modifier.
    Ability,
    /// Proficiency bonus.
    Proficiency,
    /// Feats, statuses, and other persistent bonuses.
    Bonus,
    /// One-off circumstances (cover, rule-window hooks).
    Situational,
}

/// A single labelled flat modifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub source: ModifierSource,
    pub label: String,
    pub value: i32,
}

impl Modifier {
    pub fn new(source: ModifierSource, label: impl Into<String>, value: i32) -> Self {
        Self {
            source,
            label: label.into(),
            value,
        }
    }

    pub fn ability(label: impl Into<String>, value: i32) -> Self {
        Self::new(ModifierSource::Ability, label, value)
    }

    pub fn proficiency(value: i32) -> Self {
        Self::new(ModifierSource::Proficiency, "proficiency", value)
    }

    pub fn bonus(label: impl Into<String>, value: i32) -> Self {
        Self::new(ModifierSource::Bonus, label, value)
    }

    pub fn situational(label: impl Into<String>, value: i32) -> Self {
        Self::new(ModifierSource::Situational, label, value)
    }
}

/// Sorts modifiers into application order (ability, proficiency, bonus, situational).
///
/// The sort is stable, so modifiers from the same source keep insertion order.
pub fn order_modifiers(modifiers: &mut [Modifier]) {
    modifiers.sort_by_key(|m| m.source);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_stable_within_a_source() {
        let mut mods = vec![
            Modifier::situational("cover", -2),
            Modifier::bonus("bless", 3),
            Modifier::ability("STR", 4),
            Modifier::bonus("feat", 1),
            Modifier::proficiency(2),
        ];
        order_modifiers(&mut mods);
        let labels: Vec<_> = mods.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["STR", "proficiency", "bless", "feat", "cover"]);
    }
}
