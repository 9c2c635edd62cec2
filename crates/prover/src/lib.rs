//! Groth16 proving for mixer withdrawals.
//!
//! This crate provides utilities for:
//! - Trusted setup (generating proving and verifying keys per tree height)
//! - Withdraw proof generation
//! - `Groth16Verifier`, the proof check plugged into the pool

pub mod prove;
pub mod setup;
pub mod verify;

#[cfg(test)]
mod tests;

pub use prove::{prove_withdraw, ProofWithInputs, ProveError};
pub use setup::{
    load_or_setup, setup_withdraw, withdraw_constraint_count, CircuitKeyPair, SetupError,
    WithdrawKeys,
};
pub use verify::{verify_withdraw, Groth16Verifier, VerifyError};

use ark_bn254::Fr;

/// Common field type for all operations
pub type ConstraintF = Fr;
