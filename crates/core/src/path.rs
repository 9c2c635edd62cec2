//! Authentication paths for inserted leaves.

use ark_bn254::Fr;

use crate::hasher::Hash2;

/// Authentication path of one leaf.
///
/// Contains the sibling hashes from the leaf level up to the level just below
/// the root, together with the direction taken at each level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    /// Index of the leaf this path belongs to.
    index: u64,

    /// Root the path was taken against.
    root: Fr,

    /// Sibling hashes from leaf level (0) to level `height - 1`
    siblings: Vec<Fr>,

    /// Direction at each level: true = current node is right child
    directions: Vec<bool>,
}

impl MerklePath {
    /// Create a new path. `siblings` and `directions` must have the same length.
    pub fn new(index: u64, root: Fr, siblings: Vec<Fr>, directions: Vec<bool>) -> Self {
        assert_eq!(
            siblings.len(),
            directions.len(),
            "siblings and directions must have same length"
        );
        Self {
            index,
            root,
            siblings,
            directions,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn root(&self) -> Fr {
        self.root
    }

    pub fn siblings(&self) -> &[Fr] {
        &self.siblings
    }

    pub fn directions(&self) -> &[bool] {
        &self.directions
    }

    /// Number of levels covered by the path.
    pub fn height(&self) -> usize {
        self.siblings.len()
    }

    /// Fold `leaf` up through the siblings and return the resulting root.
    pub fn compute_root<H: Hash2>(&self, hasher: &H, leaf: Fr) -> Fr {
        let mut current = leaf;

        for (sibling, &is_right) in self.siblings.iter().zip(self.directions.iter()) {
            current = if is_right {
                hasher.hash_two(*sibling, current)
            } else {
                hasher.hash_two(current, *sibling)
            };
        }

        current
    }

    /// True if `leaf` at this position hashes up to the recorded root.
    pub fn verify<H: Hash2>(&self, hasher: &H, leaf: Fr) -> bool {
        self.compute_root(hasher, leaf) == self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordered(a: Fr, b: Fr) -> Fr {
        a * Fr::from(2u64) + b
    }

    #[test]
    fn test_path_structure() {
        let siblings = vec![Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        let directions = vec![false, true, false];

        let path = MerklePath::new(2, Fr::from(9u64), siblings.clone(), directions.clone());

        assert_eq!(path.height(), 3);
        assert_eq!(path.index(), 2);
        assert_eq!(path.siblings(), &siblings);
        assert_eq!(path.directions(), &directions);
    }

    #[test]
    fn test_direction_controls_operand_order() {
        let left = MerklePath::new(0, Fr::from(0u64), vec![Fr::from(10u64)], vec![false]);
        let right = MerklePath::new(1, Fr::from(0u64), vec![Fr::from(10u64)], vec![true]);

        // leaf on the left: 2*5 + 10, leaf on the right: 2*10 + 5
        assert_eq!(left.compute_root(&ordered, Fr::from(5u64)), Fr::from(20u64));
        assert_eq!(right.compute_root(&ordered, Fr::from(5u64)), Fr::from(25u64));
    }

    #[test]
    fn test_empty_path_is_the_leaf() {
        let leaf = Fr::from(77u64);
        let path = MerklePath::new(0, leaf, Vec::new(), Vec::new());

        assert_eq!(path.compute_root(&ordered, leaf), leaf);
        assert!(path.verify(&ordered, leaf));
    }

    #[test]
    #[should_panic(expected = "siblings and directions must have same length")]
    fn test_mismatched_lengths() {
        MerklePath::new(0, Fr::from(0u64), vec![Fr::from(1u64)], Vec::new());
    }
}
