//! End-to-end withdrawals: Poseidon tree, Groth16 proofs, pool checks.

use ark_bn254::Fr;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use mixer_circuits::{Note, PoseidonHasher};
use mixer_core::{Address, Pool, PoolConfig, PoolError, ProofVerifier};

use crate::{prove_withdraw, setup_withdraw, verify_withdraw, Groth16Verifier, ProveError, WithdrawKeys};

const HEIGHT: u32 = 3;
const DENOMINATION: u128 = 1_000_000;

struct Fixture {
    keys: WithdrawKeys,
    hasher: PoseidonHasher,
    pool: Pool<PoseidonHasher, Groth16Verifier>,
    notes: Vec<Note>,
    rng: StdRng,
}

fn fixture(deposits: usize, seed: u64) -> Fixture {
    let mut rng = StdRng::seed_from_u64(seed);
    let keys = setup_withdraw(HEIGHT, &mut rng).unwrap();
    let hasher = PoseidonHasher::new();
    let verifier = Groth16Verifier::new(&keys.pair.verifying_key).unwrap();
    let mut pool = Pool::new(PoolConfig::new(HEIGHT, DENOMINATION), hasher.clone(), verifier).unwrap();

    let notes: Vec<Note> = (0..deposits).map(|_| Note::random(&mut rng)).collect();
    for note in &notes {
        pool.deposit(note.commitment(&hasher)).unwrap();
    }

    Fixture {
        keys,
        hasher,
        pool,
        notes,
        rng,
    }
}

fn recipient() -> Address {
    Address::new([0x11; 20])
}

fn relayer() -> Address {
    Address::new([0x22; 20])
}

#[test]
fn test_withdraw_with_real_proof() {
    let mut f = fixture(3, 1);
    let path = f.pool.path(1).unwrap();

    let proof = prove_withdraw(
        &f.keys,
        &f.hasher,
        &f.notes[1],
        &path,
        recipient(),
        relayer(),
        500,
        &mut f.rng,
    )
    .unwrap();
    let request = proof.to_withdraw_request().unwrap();

    let release = f.pool.withdraw(&request).unwrap();
    assert_eq!(release.recipient, recipient());
    assert_eq!(release.recipient_amount(), Some(DENOMINATION - 500));
    assert!(f.pool.is_spent(&f.notes[1].nullifier_hash(&f.hasher, 1)));

    // Replaying the exact same valid request is a double spend
    assert_eq!(f.pool.withdraw(&request).unwrap_err(), PoolError::AlreadySpent);
}

#[test]
fn test_substituted_inputs_fail_verification() {
    let mut f = fixture(2, 2);
    let path = f.pool.path(0).unwrap();
    let proof = prove_withdraw(
        &f.keys,
        &f.hasher,
        &f.notes[0],
        &path,
        recipient(),
        relayer(),
        10,
        &mut f.rng,
    )
    .unwrap();
    let honest = proof.to_withdraw_request().unwrap();

    let mut stolen = honest.clone();
    stolen.recipient = Address::new([0x66; 20]);
    assert_eq!(f.pool.withdraw(&stolen).unwrap_err(), PoolError::InvalidProof);

    let mut greedy = honest.clone();
    greedy.fee = 999;
    assert_eq!(f.pool.withdraw(&greedy).unwrap_err(), PoolError::InvalidProof);

    let mut other_relayer = honest.clone();
    other_relayer.relayer = Address::ZERO;
    assert_eq!(f.pool.withdraw(&other_relayer).unwrap_err(), PoolError::InvalidProof);

    // Nothing was consumed by the failed attempts
    assert!(f.pool.withdraw(&honest).is_ok());
}

#[test]
fn test_proof_against_old_root() {
    let mut f = fixture(1, 3);
    let path = f.pool.path(0).unwrap();
    let proof = prove_withdraw(
        &f.keys,
        &f.hasher,
        &f.notes[0],
        &path,
        recipient(),
        relayer(),
        0,
        &mut f.rng,
    )
    .unwrap();

    for i in 0..4u64 {
        f.pool.deposit(Fr::from(1000 + i)).unwrap();
    }
    assert_ne!(f.pool.root(), path.root());

    assert!(f.pool.withdraw(&proof.to_withdraw_request().unwrap()).is_ok());
}

#[test]
fn test_malformed_proof_bytes_are_rejected() {
    let mut f = fixture(1, 4);
    let path = f.pool.path(0).unwrap();
    let proof = prove_withdraw(
        &f.keys,
        &f.hasher,
        &f.notes[0],
        &path,
        recipient(),
        relayer(),
        0,
        &mut f.rng,
    )
    .unwrap();
    let mut request = proof.to_withdraw_request().unwrap();

    request.proof = Vec::new();
    assert_eq!(f.pool.withdraw(&request).unwrap_err(), PoolError::InvalidProof);

    request.proof = vec![0xff; 128];
    assert_eq!(f.pool.withdraw(&request).unwrap_err(), PoolError::InvalidProof);

    let inputs = request.public_inputs();
    assert!(!f.pool.verifier().verify(&inputs, b"short"));
}

#[test]
fn test_verification_is_repeatable() {
    let mut f = fixture(1, 5);
    let path = f.pool.path(0).unwrap();
    let proof = prove_withdraw(
        &f.keys,
        &f.hasher,
        &f.notes[0],
        &path,
        recipient(),
        relayer(),
        0,
        &mut f.rng,
    )
    .unwrap();
    let bytes = proof.serialize_proof().unwrap();

    let verifier = f.pool.verifier();
    assert!(verifier.verify(&proof.public_inputs, &bytes));
    assert!(verifier.verify(&proof.public_inputs, &bytes));
    assert!(verify_withdraw(&f.keys.pair.verifying_key, &proof.proof, &proof.public_inputs).unwrap());
}

#[test]
fn test_prove_rejects_foreign_note() {
    let mut f = fixture(2, 6);
    let path = f.pool.path(0).unwrap();

    let result = prove_withdraw(
        &f.keys,
        &f.hasher,
        &f.notes[1],
        &path,
        recipient(),
        relayer(),
        0,
        &mut f.rng,
    );
    assert!(matches!(result, Err(ProveError::InvalidWitness(_))));
}

#[test]
fn test_prove_rejects_height_mismatch() {
    let mut f = fixture(1, 7);
    let mut taller = Pool::new(
        PoolConfig::new(HEIGHT + 1, DENOMINATION),
        f.hasher.clone(),
        |_: &mixer_core::PublicInputs, _: &[u8]| true,
    )
    .unwrap();
    taller.deposit(f.notes[0].commitment(&f.hasher)).unwrap();
    let path = taller.path(0).unwrap();

    let result = prove_withdraw(
        &f.keys,
        &f.hasher,
        &f.notes[0],
        &path,
        recipient(),
        relayer(),
        0,
        &mut f.rng,
    );
    assert!(matches!(result, Err(ProveError::InvalidWitness(_))));
}
