//! Proof generation for withdrawals.

use std::time::Instant;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use thiserror::Error;

use mixer_circuits::{Note, PoseidonHasher, WithdrawCircuit};
use mixer_core::{Address, MerklePath, PublicInputs, WithdrawRequest};

use crate::setup::WithdrawKeys;

/// Errors during proof generation
#[derive(Error, Debug)]
pub enum ProveError {
    #[error("Proof generation failed: {0}")]
    ProofGeneration(String),
    #[error("Invalid witness: {0}")]
    InvalidWitness(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// A proof with its public inputs
#[derive(Clone)]
pub struct ProofWithInputs {
    pub proof: Proof<Bn254>,
    pub public_inputs: PublicInputs,
}

impl ProofWithInputs {
    /// Serialize proof to bytes
    pub fn serialize_proof(&self) -> Result<Vec<u8>, ProveError> {
        let mut bytes = Vec::new();
        self.proof
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProveError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Deserialize proof from bytes
    pub fn deserialize_proof(bytes: &[u8]) -> Result<Proof<Bn254>, ProveError> {
        Proof::deserialize_compressed(bytes).map_err(|e| ProveError::Serialization(e.to_string()))
    }

    /// Public inputs as field elements, in circuit order.
    pub fn field_inputs(&self) -> [Fr; 5] {
        self.public_inputs.to_field_elements()
    }

    /// Package the proof as a pool withdrawal.
    pub fn to_withdraw_request(&self) -> Result<WithdrawRequest, ProveError> {
        let inputs = &self.public_inputs;
        Ok(WithdrawRequest {
            proof: self.serialize_proof()?,
            root: inputs.root,
            nullifier_hash: inputs.nullifier_hash,
            recipient: inputs.recipient,
            relayer: inputs.relayer,
            fee: inputs.fee,
        })
    }
}

/// Generate a withdraw proof for `note`, whose commitment sits at `path`.
///
/// The witness is checked natively first, so a note that does not match
/// the path fails with `InvalidWitness` instead of producing a proof that
/// can never verify.
#[allow(clippy::too_many_arguments)]
pub fn prove_withdraw<R: RngCore + CryptoRng>(
    keys: &WithdrawKeys,
    hasher: &PoseidonHasher,
    note: &Note,
    path: &MerklePath,
    recipient: Address,
    relayer: Address,
    fee: u128,
    rng: &mut R,
) -> Result<ProofWithInputs, ProveError> {
    if path.height() != keys.height as usize {
        return Err(ProveError::InvalidWitness(format!(
            "path height {} does not match key height {}",
            path.height(),
            keys.height
        )));
    }

    let circuit = WithdrawCircuit::new(hasher.clone(), note, path, recipient, relayer, fee);
    if !circuit.is_consistent() {
        return Err(ProveError::InvalidWitness(format!(
            "note commitment is not at leaf {} of the given root",
            path.index()
        )));
    }
    let public_inputs = circuit
        .public_inputs()
        .ok_or_else(|| ProveError::InvalidWitness("missing public inputs".to_string()))?;

    let start = Instant::now();
    let proof = Groth16::<Bn254>::prove(&keys.pair.proving_key, circuit, rng)
        .map_err(|e| ProveError::ProofGeneration(e.to_string()))?;
    tracing::debug!(
        index = path.index(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "withdraw proof generated"
    );

    Ok(ProofWithInputs {
        proof,
        public_inputs,
    })
}
