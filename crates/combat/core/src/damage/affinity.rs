use super::DamageType;

/// How a combatant reacts to a damage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AffinityKind {
    Immune,
    Resistant,
    Vulnerable,
}

/// One affinity entry. `damage_type: None` covers every mitigable type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageAffinity {
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_type: Option<DamageType>,
    pub kind: AffinityKind,
}

impl DamageAffinity {
    pub const fn new(damage_type: DamageType, kind: AffinityKind) -> Self {
        Self {
            damage_type: Some(damage_type),
            kind,
        }
    }

    pub const fn all(kind: AffinityKind) -> Self {
        Self {
            damage_type: None,
            kind,
        }
    }

    pub fn covers(&self, damage_type: DamageType) -> bool {
        damage_type != DamageType::Untyped
            && self.damage_type.is_none_or(|covered| covered == damage_type)
    }
}

/// The single multiplier applied to one damage type after deduplication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Multiplier {
    Zero,
    Half,
    Normal,
    Double,
}

impl Multiplier {
    /// Collapses every affinity that applies to one type into one multiplier.
    ///
    /// Immunity wins outright. Resistance and vulnerability are flags, not
    /// counters, so repeated sources do not compound and one of each nets out.
    pub fn for_type(damage_type: DamageType, affinities: &[DamageAffinity]) -> Self {
        let mut resistant = false;
        let mut vulnerable = false;
        for affinity in affinities.iter().filter(|a| a.covers(damage_type)) {
            match affinity.kind {
                AffinityKind::Immune => return Multiplier::Zero,
                AffinityKind::Resistant => resistant = true,
                AffinityKind::Vulnerable => vulnerable = true,
            }
        }
        match (resistant, vulnerable) {
            (true, false) => Multiplier::Half,
            (false, true) => Multiplier::Double,
            _ => Multiplier::Normal,
        }
    }

    pub fn apply(self, amount: u32) -> u32 {
        match self {
            Multiplier::Zero => 0,
            Multiplier::Half => amount / 2,
            Multiplier::Normal => amount,
            Multiplier::Double => amount.saturating_mul(2),
        }
    }
}
