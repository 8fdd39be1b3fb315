//! Damage types, affinities, and the per-type mitigation pipeline.

mod affinity;
mod apply;
mod resolve;
mod types;

pub use affinity::{AffinityKind, DamageAffinity, Multiplier};
pub use apply::{DamageReport, DamageRequest};
pub use resolve::{DamagePacket, FinalDamage, TypedDamage, resolve_damage};
pub use types::DamageType;
