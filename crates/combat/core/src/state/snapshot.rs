//! Flat binary persistence of a running encounter.

use sha2::{Digest, Sha256};

use crate::error::{CombatError, ErrorSeverity};

use super::CombatState;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    #[error("failed to decode snapshot: {0}")]
    Decode(String),

    #[error("snapshot format version {found} is not supported (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },
}

impl CombatError for SnapshotError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            SnapshotError::Encode(_) => "SNAPSHOT_ENCODE",
            SnapshotError::Decode(_) => "SNAPSHOT_DECODE",
            SnapshotError::VersionMismatch { .. } => "SNAPSHOT_VERSION_MISMATCH",
        }
    }
}

/// Everything needed to resume an encounter, including the dice roll index.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncounterSnapshot {
    pub version: u32,
    pub state: CombatState,
}

impl EncounterSnapshot {
    pub const VERSION: u32 = 1;

    pub fn capture(state: &CombatState) -> Self {
        Self {
            version: Self::VERSION,
            state: state.clone(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        if snapshot.version != Self::VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: Self::VERSION,
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }

    /// SHA-256 of the encoded state.
    pub fn state_hash(&self) -> Result<[u8; 32], SnapshotError> {
        let bytes =
            bincode::serialize(&self.state).map_err(|e| SnapshotError::Encode(e.to_string()))?;
        Ok(Sha256::digest(&bytes).into())
    }
}
