//! Circuits and hashing for the mixer pool.
//!
//! This crate provides:
//! - `PoseidonHasher`: the node hash plugged into the pool's Merkle tree
//! - `Note`: commitment and nullifier-hash derivation for deposits
//! - `WithdrawCircuit`: the Groth16 relation checked on withdrawal

pub mod merkle;
pub mod note;
pub mod poseidon;
pub mod withdraw;

#[cfg(test)]
mod tests;

pub use merkle::{compute_root_from_path, MerklePathVar};
pub use note::Note;
pub use poseidon::{poseidon_config, PoseidonHasher};
pub use withdraw::WithdrawCircuit;

use ark_bn254::Fr;

/// Common type aliases
pub type ConstraintF = Fr;
