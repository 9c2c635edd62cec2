//! Two-to-one node compression.

use ark_bn254::Fr;

/// Deterministic two-to-one compression over the pool field.
///
/// Used for every interior node of the commitment tree and for the empty
/// subtree cache. Implementations must be pure: the same inputs always give
/// the same output, with no side effects.
pub trait Hash2 {
    /// Compress an ordered `(left, right)` pair into one field element.
    fn hash_two(&self, left: Fr, right: Fr) -> Fr;
}

impl<F> Hash2 for F
where
    F: Fn(Fr, Fr) -> Fr,
{
    fn hash_two(&self, left: Fr, right: Fr) -> Fr {
        self(left, right)
    }
}
