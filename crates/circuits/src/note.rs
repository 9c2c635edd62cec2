//! Deposit notes.
//!
//! A note is the depositor's secret. Only its commitment is ever published;
//! the nullifier hash is revealed once, at withdrawal.

use ark_bn254::Fr;
use ark_ff::UniformRand;
use ark_std::rand::Rng;
use mixer_core::{fr_from_hex, fr_to_hex, Hash2, ParseError};

/// Domain tag hashed with the nullifier to form the commitment.
pub const COMMITMENT_TAG: u64 = 0;

/// Domain tag hashed with the nullifier to form the nullifier hash.
pub const NULLIFIER_TAG: u64 = 1;

/// Secret behind one deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    nullifier: Fr,
}

impl Note {
    pub fn new(nullifier: Fr) -> Self {
        Self { nullifier }
    }

    /// Draw a fresh nullifier.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::new(Fr::rand(rng))
    }

    pub fn nullifier(&self) -> Fr {
        self.nullifier
    }

    /// `H(nullifier, 0)`, the leaf inserted at deposit.
    pub fn commitment<H: Hash2>(&self, hasher: &H) -> Fr {
        hasher.hash_two(self.nullifier, Fr::from(COMMITMENT_TAG))
    }

    /// `H(H(nullifier, 1), leaf_index)`, revealed at withdrawal.
    ///
    /// Binding the leaf index makes the hash specific to one deposit slot.
    pub fn nullifier_hash<H: Hash2>(&self, hasher: &H, leaf_index: u64) -> Fr {
        let inner = hasher.hash_two(self.nullifier, Fr::from(NULLIFIER_TAG));
        hasher.hash_two(inner, Fr::from(leaf_index))
    }

    pub fn to_hex(&self) -> String {
        fr_to_hex(&self.nullifier)
    }

    pub fn from_hex(input: &str) -> Result<Self, ParseError> {
        fr_from_hex(input).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poseidon::PoseidonHasher;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_commitment_and_nullifier_hash_differ() {
        let hasher = PoseidonHasher::new();
        let note = Note::new(Fr::from(1234u64));

        assert_ne!(note.commitment(&hasher), note.nullifier_hash(&hasher, 0));
        assert_eq!(
            note.commitment(&hasher),
            hasher.hash_two(Fr::from(1234u64), Fr::from(0u64))
        );
    }

    #[test]
    fn test_nullifier_hash_depends_on_index() {
        let hasher = PoseidonHasher::new();
        let note = Note::new(Fr::from(99u64));

        assert_ne!(note.nullifier_hash(&hasher, 0), note.nullifier_hash(&hasher, 1));
        assert_eq!(note.nullifier_hash(&hasher, 3), note.nullifier_hash(&hasher, 3));
    }

    #[test]
    fn test_random_notes_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Note::random(&mut rng);
        let b = Note::random(&mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hex_roundtrip() {
        let mut rng = StdRng::seed_from_u64(8);
        let note = Note::random(&mut rng);
        assert_eq!(Note::from_hex(&note.to_hex()).unwrap(), note);
        assert!(Note::from_hex("0x1234").is_err());
    }
}
