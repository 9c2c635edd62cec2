//! Poseidon hash over the BN254 scalar field.
//!
//! Native hashing goes through [`PoseidonHasher`], which is the node hash
//! handed to the pool's Merkle tree. The gadgets produce the same outputs
//! inside R1CS circuits.

mod config;
mod gadgets;
mod native;


pub use config::{poseidon_config, ALPHA, FULL_ROUNDS, PARTIAL_ROUNDS, RATE};
pub use gadgets::{poseidon_hash_many_var, poseidon_hash_two_var};
pub use native::{poseidon_hash_many, poseidon_hash_two, PoseidonHasher};
