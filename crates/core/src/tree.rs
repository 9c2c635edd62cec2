//! Append-only incremental Merkle tree for commitments.
//!
//! Insertion follows the filled-subtree scheme: for every level we keep the
//! most recent left-hand node, and a right-hand node that has not been
//! populated yet is always the empty-subtree hash of that level. Appending a
//! leaf therefore costs `height` hashes, independent of the number of leaves.
//!
//! Populated nodes are additionally kept per level so that an authentication
//! path can be served for any inserted leaf without rehashing.

use ark_bn254::Fr;

use crate::config::MAX_HEIGHT;
use crate::error::PoolError;
use crate::hasher::Hash2;
use crate::path::MerklePath;
use crate::zeros::ZeroCache;

/// Incremental Merkle tree of fixed height.
///
/// Leaf indices are assigned in insertion order starting at 0, and the root
/// is a pure function of the inserted leaves, the hasher and the empty leaf.
#[derive(Clone, Debug)]
pub struct MerkleEngine<H> {
    hasher: H,

    /// Empty-subtree hashes for levels `0..=height`
    zeros: ZeroCache,

    /// Number of levels between leaves and root
    height: u32,

    /// Number of leaves inserted so far
    size: u64,

    /// Most recent left-hand node per level, `height` entries
    filled_subtrees: Vec<Fr>,

    /// Current root
    root: Fr,

    /// Populated nodes per level: level 0 = leaves, level `height` = root
    layers: Vec<Vec<Fr>>,
}

impl<H: Hash2> MerkleEngine<H> {
    /// Create an empty tree with the given height and empty leaf value.
    pub fn new(hasher: H, height: u32, empty_leaf: Fr) -> Result<Self, PoolError> {
        if height > MAX_HEIGHT {
            return Err(PoolError::InvalidConfig("tree height must be at most 32"));
        }

        let zeros = ZeroCache::new(&hasher, empty_leaf, height);
        let filled_subtrees = zeros.as_slice()[..height as usize].to_vec();
        let root = zeros.empty_root();

        Ok(Self {
            hasher,
            zeros,
            height,
            size: 0,
            filled_subtrees,
            root,
            layers: vec![Vec::new(); height as usize + 1],
        })
    }

    /// Append a commitment and return its leaf index.
    ///
    /// Fails with `CapacityExceeded` once `2^height` leaves are present; the
    /// tree is left untouched in that case.
    pub fn insert(&mut self, commitment: Fr) -> Result<u64, PoolError> {
        if self.is_full() {
            return Err(PoolError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }

        let index = self.size;
        let mut current_index = index;
        let mut current_hash = commitment;

        for level in 0..self.height as usize {
            self.store_node(level, current_index, current_hash);

            let (left, right) = if current_index & 1 == 0 {
                // Left child: the right sibling is still empty
                self.filled_subtrees[level] = current_hash;
                (current_hash, self.zeros.as_slice()[level])
            } else {
                (self.filled_subtrees[level], current_hash)
            };

            current_hash = self.hasher.hash_two(left, right);
            current_index >>= 1;
        }

        self.store_node(self.height as usize, current_index, current_hash);
        self.root = current_hash;
        self.size += 1;

        Ok(index)
    }

    /// Current root; the empty-tree root before any insertion.
    pub fn root(&self) -> Fr {
        self.root
    }

    /// Authentication path for a previously inserted leaf, against the current root.
    pub fn path(&self, index: u64) -> Result<MerklePath, PoolError> {
        if index >= self.size {
            return Err(PoolError::UnknownIndex {
                index,
                size: self.size,
            });
        }

        let levels = self.height as usize;
        let mut siblings = Vec::with_capacity(levels);
        let mut directions = Vec::with_capacity(levels);

        let mut current_index = index;
        for level in 0..levels {
            let sibling_index = current_index ^ 1; // Flip last bit to get sibling
            siblings.push(self.node(level, sibling_index));
            directions.push(current_index & 1 == 1);
            current_index >>= 1;
        }

        Ok(MerklePath::new(index, self.root, siblings, directions))
    }

    /// Populated node, or the empty-subtree hash of its level.
    fn node(&self, level: usize, index: u64) -> Fr {
        self.layers[level]
            .get(index as usize)
            .copied()
            .unwrap_or(self.zeros.as_slice()[level])
    }

    fn store_node(&mut self, level: usize, index: u64, value: Fr) {
        let layer = &mut self.layers[level];
        match layer.get_mut(index as usize) {
            Some(slot) => *slot = value,
            None => layer.push(value),
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of leaves inserted so far; also the index of the next leaf.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn capacity(&self) -> u64 {
        1u64 << self.height
    }

    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Inserted commitments in index order.
    pub fn leaves(&self) -> &[Fr] {
        &self.layers[0]
    }

    /// Most recent left-hand node per level.
    pub fn filled_subtrees(&self) -> &[Fr] {
        &self.filled_subtrees
    }

    pub fn zeros(&self) -> &ZeroCache {
        &self.zeros
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}
