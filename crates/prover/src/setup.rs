//! Trusted setup utilities for generating proving and verifying keys.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use thiserror::Error;

use mixer_circuits::{PoseidonHasher, WithdrawCircuit};

/// Errors that can occur during setup
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Circuit setup failed: {0}")]
    CircuitSetup(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Deserialization failed: {0}")]
    Deserialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keys for a single circuit
#[derive(Clone)]
pub struct CircuitKeyPair {
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
}

impl CircuitKeyPair {
    /// Serialize proving key to bytes
    pub fn serialize_pk(&self) -> Result<Vec<u8>, SetupError> {
        let mut bytes = Vec::new();
        self.proving_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| SetupError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Serialize verifying key to bytes
    pub fn serialize_vk(&self) -> Result<Vec<u8>, SetupError> {
        let mut bytes = Vec::new();
        self.verifying_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| SetupError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Deserialize proving key from bytes
    pub fn deserialize_pk(bytes: &[u8]) -> Result<ProvingKey<Bn254>, SetupError> {
        ProvingKey::deserialize_compressed(bytes)
            .map_err(|e| SetupError::Deserialization(e.to_string()))
    }

    /// Deserialize verifying key from bytes
    pub fn deserialize_vk(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, SetupError> {
        VerifyingKey::deserialize_compressed(bytes)
            .map_err(|e| SetupError::Deserialization(e.to_string()))
    }
}

/// Withdraw circuit keys for one tree height.
///
/// A key pair only fits paths of the height it was generated for, so the
/// height travels with the keys and is part of their file names.
#[derive(Clone)]
pub struct WithdrawKeys {
    pub height: u32,
    pub pair: CircuitKeyPair,
}

impl WithdrawKeys {
    /// `withdraw_h{height}.pk` and `withdraw_h{height}.vk` under `dir`.
    pub fn key_paths(dir: &Path, height: u32) -> (PathBuf, PathBuf) {
        (
            dir.join(format!("withdraw_h{height}.pk")),
            dir.join(format!("withdraw_h{height}.vk")),
        )
    }

    /// True if both key files for `height` exist under `dir`.
    pub fn exist_in(dir: &Path, height: u32) -> bool {
        let (pk, vk) = Self::key_paths(dir, height);
        pk.exists() && vk.exists()
    }

    /// Save keys to a directory
    pub fn save_to_directory(&self, dir: &Path) -> Result<(), SetupError> {
        std::fs::create_dir_all(dir)?;

        let (pk_path, vk_path) = Self::key_paths(dir, self.height);
        std::fs::write(pk_path, self.pair.serialize_pk()?)?;
        std::fs::write(vk_path, self.pair.serialize_vk()?)?;

        Ok(())
    }

    /// Load keys for `height` from a directory
    pub fn load_from_directory(dir: &Path, height: u32) -> Result<Self, SetupError> {
        let (pk_path, vk_path) = Self::key_paths(dir, height);

        let pair = CircuitKeyPair {
            proving_key: CircuitKeyPair::deserialize_pk(&std::fs::read(pk_path)?)?,
            verifying_key: CircuitKeyPair::deserialize_vk(&std::fs::read(vk_path)?)?,
        };

        Ok(Self { height, pair })
    }
}

/// Run trusted setup for the withdraw circuit of a tree of `height`.
pub fn setup_withdraw<R: RngCore + CryptoRng>(
    height: u32,
    rng: &mut R,
) -> Result<WithdrawKeys, SetupError> {
    let start = Instant::now();
    let circuit = WithdrawCircuit::empty(PoseidonHasher::new(), height as usize);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)
        .map_err(|e| SetupError::CircuitSetup(e.to_string()))?;

    tracing::info!(
        height,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "withdraw circuit setup complete"
    );

    Ok(WithdrawKeys {
        height,
        pair: CircuitKeyPair {
            proving_key: pk,
            verifying_key: vk,
        },
    })
}

/// Load keys for `height` from `dir`, or run setup and save them there.
pub fn load_or_setup<R: RngCore + CryptoRng>(
    dir: &Path,
    height: u32,
    rng: &mut R,
) -> Result<WithdrawKeys, SetupError> {
    if WithdrawKeys::exist_in(dir, height) {
        tracing::info!(height, dir = %dir.display(), "loading withdraw keys");
        return WithdrawKeys::load_from_directory(dir, height);
    }

    tracing::info!(height, "no withdraw keys found, running setup");
    let keys = setup_withdraw(height, rng)?;
    keys.save_to_directory(dir)?;
    Ok(keys)
}

/// Number of R1CS constraints in the withdraw circuit for `height`.
pub fn withdraw_constraint_count(height: u32) -> Result<usize, SetupError> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_mode(ark_relations::r1cs::SynthesisMode::Setup);

    WithdrawCircuit::empty(PoseidonHasher::new(), height as usize)
        .generate_constraints(cs.clone())
        .map_err(|e| SetupError::CircuitSetup(e.to_string()))?;

    Ok(cs.num_constraints())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_setup_withdraw_serializes() {
        let mut rng = StdRng::seed_from_u64(42);
        let keys = setup_withdraw(3, &mut rng).unwrap();

        let pk_bytes = keys.pair.serialize_pk().unwrap();
        let vk_bytes = keys.pair.serialize_vk().unwrap();

        let _pk = CircuitKeyPair::deserialize_pk(&pk_bytes).unwrap();
        let vk = CircuitKeyPair::deserialize_vk(&vk_bytes).unwrap();

        // One slot for the constant plus five public inputs
        assert_eq!(vk.gamma_abc_g1.len(), 6);
    }

    #[test]
    fn test_save_and_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let keys = setup_withdraw(3, &mut rng).unwrap();

        assert!(!WithdrawKeys::exist_in(dir.path(), 3));
        keys.save_to_directory(dir.path()).unwrap();
        assert!(WithdrawKeys::exist_in(dir.path(), 3));
        assert!(!WithdrawKeys::exist_in(dir.path(), 4));

        let loaded = WithdrawKeys::load_from_directory(dir.path(), 3).unwrap();
        assert_eq!(loaded.height, 3);
        assert_eq!(loaded.pair.verifying_key, keys.pair.verifying_key);
    }

    #[test]
    fn test_load_or_setup_reuses_saved_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        let first = load_or_setup(dir.path(), 3, &mut rng).unwrap();
        let second = load_or_setup(dir.path(), 3, &mut rng).unwrap();
        assert_eq!(first.pair.verifying_key, second.pair.verifying_key);
    }

    #[test]
    fn test_corrupt_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let (pk_path, vk_path) = WithdrawKeys::key_paths(dir.path(), 3);
        std::fs::write(pk_path, b"not a key").unwrap();
        std::fs::write(vk_path, b"not a key").unwrap();

        let result = WithdrawKeys::load_from_directory(dir.path(), 3);
        assert!(matches!(result, Err(SetupError::Deserialization(_))));
    }

    #[test]
    fn test_constraint_count_grows_with_height() {
        let small = withdraw_constraint_count(3).unwrap();
        let large = withdraw_constraint_count(6).unwrap();
        println!("Withdraw constraints: h=3 {}, h=6 {}", small, large);
        assert!(large > small);
    }
}
