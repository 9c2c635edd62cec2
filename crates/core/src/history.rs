//! Root history.
//!
//! Every root the tree has ever had is retained, in production order. There
//! is no recency window: a proof built against an old root stays redeemable
//! for the lifetime of the pool.

use std::collections::HashMap;

use ark_bn254::Fr;

/// Append-only log of tree roots with constant-time membership queries.
#[derive(Clone, Debug, Default)]
pub struct RootHistory {
    /// Roots in the order they were produced
    roots: Vec<Fr>,

    /// Root -> position of its first occurrence
    positions: HashMap<Fr, usize>,
}

impl RootHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly produced root. Roots are never deduplicated.
    pub fn append(&mut self, root: Fr) {
        let position = self.roots.len();
        self.positions.entry(root).or_insert(position);
        self.roots.push(root);

        tracing::debug!(position, root = %crate::field::fr_to_hex(&root), "root appended");
    }

    /// Returns `true` if the root was produced at any point in the past.
    pub fn contains(&self, root: &Fr) -> bool {
        self.positions.contains_key(root)
    }

    /// History position at which `root` was first produced.
    pub fn position(&self, root: &Fr) -> Option<usize> {
        self.positions.get(root).copied()
    }

    /// Most recently appended root.
    pub fn latest(&self) -> Option<Fr> {
        self.roots.last().copied()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn as_slice(&self) -> &[Fr] {
        &self.roots
    }
}
