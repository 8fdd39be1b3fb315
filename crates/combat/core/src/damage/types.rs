use std::str::FromStr;

/// Damage types. Unknown names in content degrade to [`DamageType::Untyped`].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Thunder,
    Acid,
    Poison,
    Necrotic,
    Radiant,
    Psychic,
    Force,
    /// Never mitigated by affinities.
    Untyped,
}

impl DamageType {
    /// Parses a damage type name, falling back to `Untyped` with a warning.
    pub fn parse_lenient(name: &str) -> Self {
        match DamageType::from_str(name.trim()) {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(damage_type = name, "unknown damage type, treating as untyped");
                DamageType::Untyped
            }
        }
    }

    pub fn is_physical(self) -> bool {
        matches!(
            self,
            DamageType::Slashing | DamageType::Piercing | DamageType::Bludgeoning
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DamageType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DamageType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(DamageType::parse_lenient(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_become_untyped() {
        assert_eq!(DamageType::parse_lenient("FIRE"), DamageType::Fire);
        assert_eq!(DamageType::parse_lenient("chaos"), DamageType::Untyped);
        assert_eq!(DamageType::Cold.to_string(), "cold");
    }
}
