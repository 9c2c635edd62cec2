//! Withdraw proof verification.

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use ark_snark::SNARK;
use thiserror::Error;

use mixer_core::{ProofVerifier, PublicInputs};

/// Errors during verification
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Verification failed: {0}")]
    Verification(String),
    #[error("Invalid verifying key: {0}")]
    InvalidKey(String),
}

/// Verify a withdraw proof against its public inputs.
pub fn verify_withdraw(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    inputs: &PublicInputs,
) -> Result<bool, VerifyError> {
    Groth16::<Bn254>::verify(vk, &inputs.to_field_elements(), proof)
        .map_err(|e| VerifyError::Verification(e.to_string()))
}

/// Groth16 proof check for the pool.
///
/// Proof bytes are a compressed `Proof<Bn254>`. Anything that fails to
/// decode or verify is rejected; this never panics on untrusted input.
#[derive(Clone)]
pub struct Groth16Verifier {
    pvk: PreparedVerifyingKey<Bn254>,
}

impl Groth16Verifier {
    pub fn new(vk: &VerifyingKey<Bn254>) -> Result<Self, VerifyError> {
        let pvk = Groth16::<Bn254>::process_vk(vk)
            .map_err(|e| VerifyError::InvalidKey(e.to_string()))?;
        Ok(Self { pvk })
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.pvk.vk
    }
}

impl ProofVerifier for Groth16Verifier {
    fn verify(&self, inputs: &PublicInputs, proof: &[u8]) -> bool {
        let proof = match Proof::<Bn254>::deserialize_compressed(proof) {
            Ok(proof) => proof,
            Err(e) => {
                tracing::warn!(error = %e, "malformed withdraw proof");
                return false;
            }
        };

        match Groth16::<Bn254>::verify_with_processed_vk(
            &self.pvk,
            &inputs.to_field_elements(),
            &proof,
        ) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(error = %e, "withdraw proof verification error");
                false
            }
        }
    }
}
