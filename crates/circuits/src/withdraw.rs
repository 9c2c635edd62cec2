//! Withdraw circuit.
//!
//! Proves knowledge of a note whose commitment sits in the tree with a given
//! root, and that the published nullifier hash belongs to that note and leaf.
//!
//! Public inputs, in order: root, nullifier hash, recipient, relayer, fee.
//! Witnesses: the note nullifier and the Merkle path of its commitment.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use mixer_core::{Address, MerklePath, PublicInputs};

use crate::merkle::{compute_root_from_path, MerklePathVar};
use crate::note::{Note, COMMITMENT_TAG, NULLIFIER_TAG};
use crate::poseidon::{poseidon_hash_two_var, PoseidonHasher};

/// Withdraw circuit for a tree of fixed height.
#[derive(Clone)]
pub struct WithdrawCircuit {
    hasher: PoseidonHasher,
    height: usize,

    // Public inputs
    pub root: Option<Fr>,
    pub nullifier_hash: Option<Fr>,
    pub recipient: Option<Address>,
    pub relayer: Option<Address>,
    pub fee: Option<u128>,

    // Witnesses
    pub nullifier: Option<Fr>,
    pub siblings: Option<Vec<Fr>>,
    pub directions: Option<Vec<bool>>,
}

impl WithdrawCircuit {
    /// Create a circuit without assignments, for key generation.
    pub fn empty(hasher: PoseidonHasher, height: usize) -> Self {
        Self {
            hasher,
            height,
            root: None,
            nullifier_hash: None,
            recipient: None,
            relayer: None,
            fee: None,
            nullifier: None,
            siblings: None,
            directions: None,
        }
    }

    /// Create a fully assigned circuit for withdrawing `note`.
    ///
    /// `path` must be the authentication path of the note's commitment;
    /// its root becomes the public root.
    pub fn new(
        hasher: PoseidonHasher,
        note: &Note,
        path: &MerklePath,
        recipient: Address,
        relayer: Address,
        fee: u128,
    ) -> Self {
        let nullifier_hash = note.nullifier_hash(&hasher, path.index());

        Self {
            height: path.height(),
            root: Some(path.root()),
            nullifier_hash: Some(nullifier_hash),
            recipient: Some(recipient),
            relayer: Some(relayer),
            fee: Some(fee),
            nullifier: Some(note.nullifier()),
            siblings: Some(path.siblings().to_vec()),
            directions: Some(path.directions().to_vec()),
            hasher,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Public inputs this circuit is assigned to, if fully assigned.
    pub fn public_inputs(&self) -> Option<PublicInputs> {
        Some(PublicInputs {
            root: self.root?,
            nullifier_hash: self.nullifier_hash?,
            recipient: self.recipient?,
            relayer: self.relayer?,
            fee: self.fee?,
        })
    }

    /// Check the witness natively, without building constraints.
    pub fn is_consistent(&self) -> bool {
        let (Some(nullifier), Some(siblings), Some(directions), Some(root), Some(nullifier_hash)) = (
            self.nullifier,
            self.siblings.as_ref(),
            self.directions.as_ref(),
            self.root,
            self.nullifier_hash,
        ) else {
            return false;
        };
        if siblings.len() != self.height || directions.len() != self.height {
            return false;
        }

        let index = directions
            .iter()
            .rev()
            .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit));
        let path = MerklePath::new(index, root, siblings.clone(), directions.clone());
        let note = Note::new(nullifier);

        path.verify(&self.hasher, note.commitment(&self.hasher))
            && note.nullifier_hash(&self.hasher, index) == nullifier_hash
    }
}

impl ConstraintSynthesizer<Fr> for WithdrawCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let config = self.hasher.config();

        // === Allocate public inputs ===
        let root_var = FpVar::new_input(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nullifier_hash_var = FpVar::new_input(cs.clone(), || {
            self.nullifier_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let recipient_var = FpVar::new_input(cs.clone(), || {
            self.recipient
                .map(|a| a.to_field())
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let relayer_var = FpVar::new_input(cs.clone(), || {
            self.relayer
                .map(|a| a.to_field())
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let fee_var = FpVar::new_input(cs.clone(), || {
            self.fee.map(Fr::from).ok_or(SynthesisError::AssignmentMissing)
        })?;

        // === Allocate witnesses ===
        let nullifier_var = FpVar::new_witness(cs.clone(), || {
            self.nullifier.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let path_var = MerklePathVar::new_witness(
            cs.clone(),
            self.height,
            self.siblings.as_deref(),
            self.directions.as_deref(),
        )?;

        // === Constraint 1: commitment = H(nullifier, 0) is in the tree ===
        let commitment_var = poseidon_hash_two_var(
            cs.clone(),
            config,
            &nullifier_var,
            &FpVar::constant(Fr::from(COMMITMENT_TAG)),
        )?;
        let computed_root = compute_root_from_path(cs.clone(), config, &commitment_var, &path_var)?;
        computed_root.enforce_equal(&root_var)?;

        // === Constraint 2: nullifier hash = H(H(nullifier, 1), leaf index) ===
        let inner = poseidon_hash_two_var(
            cs.clone(),
            config,
            &nullifier_var,
            &FpVar::constant(Fr::from(NULLIFIER_TAG)),
        )?;
        let index_var = path_var.leaf_index()?;
        let computed_nullifier_hash = poseidon_hash_two_var(cs.clone(), config, &inner, &index_var)?;
        computed_nullifier_hash.enforce_equal(&nullifier_hash_var)?;

        // === Constraint 3: bind recipient, relayer and fee ===
        // Squaring forces each input into a constraint so it cannot be swapped.
        let _ = recipient_var.square()?;
        let _ = relayer_var.square()?;
        let _ = fee_var.square()?;

        Ok(())
    }
}
