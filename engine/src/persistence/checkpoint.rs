//! Checkpoint - JSON snapshot of RNG state
//!
//! Carries the same information as the binary layout, plus a SHA256 digest
//! of the seed so a corrupted or hand-edited checkpoint is rejected instead
//! of silently producing a different game.

use crate::config::RngConfig;
use crate::core::{Seed, SEED_LEN};
use crate::error::RngError;
use crate::rng::{RngContext, StreamId, STREAM_COUNT};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete RNG state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSnapshot {
    /// Seed as lowercase hex
    pub seed_hex: String,

    /// SHA256 of the raw seed bytes, lowercase hex
    pub seed_digest: String,

    /// One entry per stream
    pub streams: Vec<StreamSnapshot>,
}

/// Counters of one stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    pub stream: StreamId,
    pub position: u64,
    pub budgeted_position: u64,
}

/// Hex SHA256 of `seed`.
pub fn compute_seed_digest(seed: &Seed) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Checks digest and stream coverage, returning the decoded seed and the
/// counters in canonical order.
pub fn validate_snapshot(
    snapshot: &RngSnapshot,
) -> Result<(Seed, [(u64, u64); STREAM_COUNT]), RngError> {
    // 1. Seed decodes to the right length
    let bytes = hex::decode(&snapshot.seed_hex)
        .map_err(|e| RngError::StateValidation(format!("Seed is not valid hex: {}", e)))?;
    let seed: Seed = bytes.as_slice().try_into().map_err(|_| {
        RngError::StateValidation(format!(
            "Seed must be {} bytes, got {}",
            SEED_LEN,
            bytes.len()
        ))
    })?;

    // 2. Digest matches
    let digest = compute_seed_digest(&seed);
    if digest != snapshot.seed_digest {
        return Err(RngError::StateValidation(format!(
            "Seed digest mismatch: expected {}, got {}",
            snapshot.seed_digest, digest
        )));
    }

    // 3. Every stream exactly once
    let mut counters: [Option<(u64, u64)>; STREAM_COUNT] = [None; STREAM_COUNT];
    for entry in &snapshot.streams {
        let slot = &mut counters[entry.stream.index()];
        if slot.is_some() {
            return Err(RngError::StateValidation(format!(
                "Duplicate entry for {} stream",
                entry.stream
            )));
        }
        *slot = Some((entry.position, entry.budgeted_position));
    }

    let mut resolved = [(0u64, 0u64); STREAM_COUNT];
    for stream in StreamId::ALL {
        resolved[stream.index()] = counters[stream.index()].ok_or_else(|| {
            RngError::StateValidation(format!("Missing entry for {} stream", stream))
        })?;
    }

    Ok((seed, resolved))
}

impl RngContext {
    /// Captures the current state.
    pub fn snapshot(&self) -> Result<RngSnapshot, RngError> {
        self.ensure_no_active_budget("snapshot")?;

        Ok(RngSnapshot {
            seed_hex: hex::encode(self.seed),
            seed_digest: compute_seed_digest(&self.seed),
            streams: StreamId::ALL
                .iter()
                .map(|&stream| StreamSnapshot {
                    stream,
                    position: self.position(stream),
                    budgeted_position: self.budgeted_position(stream),
                })
                .collect(),
        })
    }

    /// Serializes the current state as JSON.
    pub fn save_state(&self) -> Result<String, RngError> {
        let snapshot = self.snapshot()?;
        serde_json::to_string(&snapshot)
            .map_err(|e| RngError::Serialization(format!("Snapshot serialization failed: {}", e)))
    }

    /// Builds a context from a validated snapshot.
    pub fn from_snapshot(config: RngConfig, snapshot: &RngSnapshot) -> Result<Self, RngError> {
        let (seed, counters) = validate_snapshot(snapshot)?;
        let mut context = RngContext::from_seed(config, seed)?;
        context.apply_restored(seed, counters);
        Ok(context)
    }

    /// Builds a context from JSON produced by [`RngContext::save_state`].
    pub fn load_state(config: RngConfig, json: &str) -> Result<Self, RngError> {
        let snapshot: RngSnapshot = serde_json::from_str(json).map_err(|e| {
            RngError::Serialization(format!("Snapshot deserialization failed: {}", e))
        })?;
        Self::from_snapshot(config, &snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RngSnapshot {
        let mut rng = RngContext::from_seed(RngConfig::default(), [0x21; SEED_LEN]).unwrap();
        rng.draw(StreamId::Core);
        rng.snapshot().unwrap()
    }

    #[test]
    fn test_seed_digest_deterministic() {
        let a = compute_seed_digest(&[1; SEED_LEN]);
        let b = compute_seed_digest(&[1; SEED_LEN]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, compute_seed_digest(&[2; SEED_LEN]));
    }

    #[test]
    fn test_validate_accepts_own_snapshot() {
        let (seed, counters) = validate_snapshot(&snapshot()).unwrap();
        assert_eq!(seed, [0x21; SEED_LEN]);
        assert_eq!(counters[StreamId::Core.index()], (1, 1));
    }

    #[test]
    fn test_validate_rejects_missing_stream() {
        let mut snap = snapshot();
        snap.streams.retain(|s| s.stream != StreamId::Display);

        let err = validate_snapshot(&snap).unwrap_err();
        assert!(err.to_string().contains("Missing entry for display"));
    }

    #[test]
    fn test_validate_rejects_duplicate_stream() {
        let mut snap = snapshot();
        let dup = snap.streams[0].clone();
        snap.streams.push(dup);

        assert!(matches!(
            validate_snapshot(&snap),
            Err(RngError::StateValidation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_short_seed() {
        let mut snap = snapshot();
        snap.seed_hex = "abcd".to_string();

        let err = validate_snapshot(&snap).unwrap_err();
        assert!(err.to_string().contains("Seed must be 32 bytes"));
    }
}
