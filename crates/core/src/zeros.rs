//! Empty-subtree hashes.

use ark_bn254::Fr;

use crate::hasher::Hash2;

/// Hash of an all-empty subtree at every level of a tree.
///
/// `zeros[0]` is the canonical empty leaf and
/// `zeros[i] = H(zeros[i-1], zeros[i-1])` up to `zeros[height]`, which is the
/// root of the empty tree.
///
/// A cache is tied to the hasher and empty leaf it was built from; caches
/// built from different configurations are not interchangeable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeroCache {
    zeros: Vec<Fr>,
}

impl ZeroCache {
    /// Precompute the empty hashes for levels `0..=height`.
    pub fn new<H: Hash2>(hasher: &H, empty_leaf: Fr, height: u32) -> Self {
        let mut zeros = Vec::with_capacity(height as usize + 1);

        let mut current = empty_leaf;
        zeros.push(current);
        for _ in 0..height {
            current = hasher.hash_two(current, current);
            zeros.push(current);
        }

        Self { zeros }
    }

    /// Tree height this cache was built for.
    pub fn height(&self) -> u32 {
        (self.zeros.len() - 1) as u32
    }

    /// Empty-subtree hash at `level`, or `None` above the tree height.
    pub fn get(&self, level: u32) -> Option<Fr> {
        self.zeros.get(level as usize).copied()
    }

    /// The canonical empty leaf.
    pub fn empty_leaf(&self) -> Fr {
        self.zeros[0]
    }

    /// Root of a tree with no leaves.
    pub fn empty_root(&self) -> Fr {
        self.zeros[self.zeros.len() - 1]
    }

    pub fn as_slice(&self) -> &[Fr] {
        &self.zeros
    }
}
