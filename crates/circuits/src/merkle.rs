//! In-circuit Merkle path verification.
//!
//! Mirrors `MerklePath::compute_root` from the core: at each level the
//! direction bit says whether the running node is the right child.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_r1cs_std::{boolean::Boolean, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::poseidon::poseidon_hash_two_var;

/// Circuit variable representation of a Merkle path.
#[derive(Clone)]
pub struct MerklePathVar {
    /// Sibling hashes, leaf level first
    siblings: Vec<FpVar<Fr>>,

    /// `true` where the running node is the right child
    directions: Vec<Boolean<Fr>>,
}

impl MerklePathVar {
    /// Allocate a path of `height` levels as witness variables.
    ///
    /// Missing values are only acceptable during key generation.
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        height: usize,
        siblings: Option<&[Fr]>,
        directions: Option<&[bool]>,
    ) -> Result<Self, SynthesisError> {
        let siblings = (0..height)
            .map(|level| {
                FpVar::new_witness(cs.clone(), || {
                    siblings
                        .and_then(|s| s.get(level).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let directions = (0..height)
            .map(|level| {
                Boolean::new_witness(cs.clone(), || {
                    directions
                        .and_then(|d| d.get(level).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            siblings,
            directions,
        })
    }

    pub fn siblings(&self) -> &[FpVar<Fr>] {
        &self.siblings
    }

    pub fn directions(&self) -> &[Boolean<Fr>] {
        &self.directions
    }

    pub fn height(&self) -> usize {
        self.siblings.len()
    }

    /// Leaf index encoded by the direction bits (little-endian).
    pub fn leaf_index(&self) -> Result<FpVar<Fr>, SynthesisError> {
        let mut index = FpVar::zero();
        let mut coeff = Fr::from(1u64);

        for bit in &self.directions {
            index += FpVar::from(bit.clone()) * coeff;
            coeff = coeff + coeff;
        }

        Ok(index)
    }
}

/// Compute the root reached from `leaf` along `path`.
pub fn compute_root_from_path(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    leaf: &FpVar<Fr>,
    path: &MerklePathVar,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut current = leaf.clone();

    for (sibling, is_right) in path.siblings.iter().zip(path.directions.iter()) {
        // If is_right: H(sibling, current), else H(current, sibling)
        let left = is_right.select(sibling, &current)?;
        let right = is_right.select(&current, sibling)?;

        current = poseidon_hash_two_var(cs.clone(), config, &left, &right)?;
    }

    Ok(current)
}
