//! Persisted pool state.
//!
//! The functional state of a pool is its tree size, filled-subtree cache,
//! root history and nullifier set. The leaf sequence is stored as well so a
//! restored pool can keep serving authentication paths.

use ark_bn254::Fr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::error::PoolError;

/// Serializable image of a [`Pool`](crate::Pool).
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PoolSnapshot {
    pub height: u32,
    pub empty_leaf: Fr,
    pub size: u64,
    pub filled_subtrees: Vec<Fr>,
    pub roots: Vec<Fr>,
    /// Spent nullifier hashes, ascending
    pub nullifiers: Vec<Fr>,
    pub leaves: Vec<Fr>,
}

impl PoolSnapshot {
    /// Serialize snapshot to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, PoolError> {
        let mut bytes = Vec::new();
        self.serialize_compressed(&mut bytes)
            .map_err(|e| PoolError::Snapshot(e.to_string()))?;
        Ok(bytes)
    }

    /// Deserialize snapshot from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PoolError> {
        Self::deserialize_compressed(bytes).map_err(|e| PoolError::Snapshot(e.to_string()))
    }
}
