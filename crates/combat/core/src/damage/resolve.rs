use std::collections::BTreeMap;

use super::{DamageAffinity, DamageType, Multiplier};

/// Raw damage grouped by type, before mitigation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamagePacket(pub BTreeMap<DamageType, u32>);

impl DamagePacket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(damage_type: DamageType, amount: u32) -> Self {
        let mut packet = Self::new();
        packet.add(damage_type, amount);
        packet
    }

    pub fn add(&mut self, damage_type: DamageType, amount: u32) {
        let entry = self.0.entry(damage_type).or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn raw_total(&self) -> u32 {
        self.0.values().fold(0, |total, amount| total.saturating_add(*amount))
    }

    pub fn is_empty(&self) -> bool {
        self.raw_total() == 0
    }

    /// Scales every entry down by `percent` (rounding the kept part down).
    pub fn reduce_by_percent(&mut self, percent: u32) {
        let keep = 100u32.saturating_sub(percent.min(100));
        for amount in self.0.values_mut() {
            let kept = u64::from(*amount) * u64::from(keep) / 100;
            *amount = u32::try_from(kept).unwrap_or(u32::MAX);
        }
    }

    pub fn types(&self) -> impl Iterator<Item = DamageType> + '_ {
        self.0.keys().copied()
    }
}

/// Mitigated damage for one type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypedDamage {
    pub damage_type: DamageType,
    pub raw: u32,
    pub multiplier: Multiplier,
    pub amount: u32,
}

/// Result of running a packet through a target's affinities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinalDamage {
    pub entries: Vec<TypedDamage>,
    pub total: u32,
}

/// Applies exactly one multiplier per damage type present in `packet`.
pub fn resolve_damage(packet: &DamagePacket, affinities: &[DamageAffinity]) -> FinalDamage {
    let entries: Vec<TypedDamage> = packet
        .0
        .iter()
        .map(|(&damage_type, &raw)| {
            let multiplier = Multiplier::for_type(damage_type, affinities);
            TypedDamage {
                damage_type,
                raw,
                multiplier,
                amount: multiplier.apply(raw),
            }
        })
        .collect();
    let total = entries
        .iter()
        .fold(0u32, |total, entry| total.saturating_add(entry.amount));
    FinalDamage { entries, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::AffinityKind;

    #[test]
    fn two_resistances_halve_once() {
        let affinities = [
            DamageAffinity::new(DamageType::Fire, AffinityKind::Resistant),
            DamageAffinity::new(DamageType::Fire, AffinityKind::Resistant),
        ];
        let result = resolve_damage(&DamagePacket::single(DamageType::Fire, 20), &affinities);
        assert_eq!(result.total, 10);
        assert_eq!(result.entries[0].multiplier, Multiplier::Half);
    }

    #[test]
    fn types_are_mitigated_independently() {
        let mut packet = DamagePacket::new();
        packet.add(DamageType::Slashing, 9);
        packet.add(DamageType::Fire, 6);
        packet.add(DamageType::Untyped, 3);
        let affinities = [
            DamageAffinity::new(DamageType::Slashing, AffinityKind::Resistant),
            DamageAffinity::new(DamageType::Fire, AffinityKind::Vulnerable),
        ];
        let result = resolve_damage(&packet, &affinities);
        assert_eq!(result.total, 4 + 12 + 3);
    }

    #[test]
    fn reduce_by_percent_rounds_down() {
        let mut packet = DamagePacket::single(DamageType::Piercing, 7);
        packet.reduce_by_percent(50);
        assert_eq!(packet.raw_total(), 3);
    }

    #[test]
    fn oversized_packets_saturate() {
        let mut packet = DamagePacket::single(DamageType::Fire, u32::MAX);
        packet.add(DamageType::Fire, 10);
        packet.add(DamageType::Cold, u32::MAX);
        assert_eq!(packet.raw_total(), u32::MAX);
        assert_eq!(resolve_damage(&packet, &[]).total, u32::MAX);

        packet.reduce_by_percent(50);
        assert_eq!(packet.0[&DamageType::Fire], u32::MAX / 2);
    }
}
