//! Nullifier registry.
//!
//! Requirements:
//! - membership checks must be fast
//! - a nullifier hash is inserted at most once and never removed
//! - iteration order does not matter (only presence/absence)

use std::collections::HashSet;

use ark_bn254::Fr;

use crate::error::PoolError;

/// Set of consumed nullifier hashes.
#[derive(Clone, Debug, Default)]
pub struct NullifierRegistry {
    spent: HashSet<Fr>,
}

impl NullifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the nullifier hash has already been consumed.
    pub fn contains(&self, nullifier_hash: &Fr) -> bool {
        self.spent.contains(nullifier_hash)
    }

    /// Mark a nullifier hash as consumed.
    ///
    /// Check and insertion are a single step: a second insertion of the same
    /// value fails with `AlreadySpent` and leaves the registry unchanged.
    pub fn insert(&mut self, nullifier_hash: Fr) -> Result<(), PoolError> {
        if self.spent.insert(nullifier_hash) {
            Ok(())
        } else {
            Err(PoolError::AlreadySpent)
        }
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }

    /// Consumed nullifier hashes in ascending order.
    pub fn to_sorted_vec(&self) -> Vec<Fr> {
        let mut spent: Vec<Fr> = self.spent.iter().copied().collect();
        spent.sort();
        spent
    }
}
