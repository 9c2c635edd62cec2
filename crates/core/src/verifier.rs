//! Withdraw proof predicate.

use ark_bn254::Fr;

use crate::field::Address;

/// Public inputs a withdraw proof is bound to.
///
/// The order of [`PublicInputs::to_field_elements`] is fixed and must match
/// the relation the proving system was set up for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PublicInputs {
    /// Historical tree root the proof is anchored to
    pub root: Fr,
    /// Anti-replay key of the note being withdrawn
    pub nullifier_hash: Fr,
    /// Receiver of `denomination - fee`
    pub recipient: Address,
    /// Party submitting the withdrawal, receiver of `fee`
    pub relayer: Address,
    /// Relayer fee
    pub fee: u128,
}

impl PublicInputs {
    /// `[root, nullifier_hash, recipient, relayer, fee]` as field elements.
    pub fn to_field_elements(&self) -> [Fr; 5] {
        [
            self.root,
            self.nullifier_hash,
            self.recipient.to_field(),
            self.relayer.to_field(),
            Fr::from(self.fee),
        ]
    }
}

/// Zero-knowledge proof predicate consumed by the pool.
///
/// Implementations must be pure: verifying the same inputs and proof twice
/// yields the same answer and has no side effects. A proof that cannot be
/// decoded is simply rejected.
pub trait ProofVerifier {
    fn verify(&self, inputs: &PublicInputs, proof: &[u8]) -> bool;
}

impl<F> ProofVerifier for F
where
    F: Fn(&PublicInputs, &[u8]) -> bool,
{
    fn verify(&self, inputs: &PublicInputs, proof: &[u8]) -> bool {
        self(inputs, proof)
    }
}
