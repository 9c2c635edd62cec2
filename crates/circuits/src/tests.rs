//! Withdraw circuit against a live pool.

use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_std::rand::{rngs::StdRng, SeedableRng};
use mixer_core::{Address, Pool, PoolConfig, PublicInputs};

use crate::{Note, PoseidonHasher, WithdrawCircuit};

const HEIGHT: u32 = 4;

type TestPool = Pool<PoseidonHasher, fn(&PublicInputs, &[u8]) -> bool>;

fn accept_all(_: &PublicInputs, _: &[u8]) -> bool {
    true
}

/// Pool with `count` random notes deposited, returned with those notes.
fn pool_with_notes(count: usize, seed: u64) -> (TestPool, Vec<Note>) {
    let hasher = PoseidonHasher::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pool: TestPool = Pool::new(
        PoolConfig::new(HEIGHT, 1_000),
        hasher.clone(),
        accept_all as fn(&PublicInputs, &[u8]) -> bool,
    )
    .unwrap();

    let notes: Vec<Note> = (0..count).map(|_| Note::random(&mut rng)).collect();
    for note in &notes {
        pool.deposit(note.commitment(&hasher)).unwrap();
    }
    (pool, notes)
}

fn is_satisfied(circuit: WithdrawCircuit) -> bool {
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.generate_constraints(cs.clone()).unwrap();
    cs.is_satisfied().unwrap()
}

fn recipient() -> Address {
    Address::new([0x11; 20])
}

fn relayer() -> Address {
    Address::new([0x22; 20])
}

#[test]
fn test_valid_withdraw_satisfies_circuit() {
    let (pool, notes) = pool_with_notes(5, 1);
    let hasher = PoseidonHasher::new();

    for (index, note) in notes.iter().enumerate() {
        let path = pool.path(index as u64).unwrap();
        let circuit = WithdrawCircuit::new(hasher.clone(), note, &path, recipient(), relayer(), 10);

        assert!(circuit.is_consistent());
        assert!(is_satisfied(circuit), "leaf {index} should verify");
    }
}

#[test]
fn test_public_inputs_order() {
    let (pool, notes) = pool_with_notes(3, 2);
    let hasher = PoseidonHasher::new();
    let path = pool.path(2).unwrap();
    let circuit = WithdrawCircuit::new(hasher.clone(), &notes[2], &path, recipient(), relayer(), 7);

    let inputs = circuit.public_inputs().unwrap();
    assert_eq!(inputs.root, pool.root());
    assert_eq!(inputs.nullifier_hash, notes[2].nullifier_hash(&hasher, 2));

    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.generate_constraints(cs.clone()).unwrap();
    let instance = cs.borrow().unwrap().instance_assignment.clone();

    // Slot 0 is the constant one
    assert_eq!(&instance[1..], &inputs.to_field_elements()[..]);
}

#[test]
fn test_old_root_still_satisfies() {
    let (mut pool, notes) = pool_with_notes(1, 3);
    let hasher = PoseidonHasher::new();
    let path = pool.path(0).unwrap();

    pool.deposit(Fr::from(12345u64)).unwrap();
    assert_ne!(path.root(), pool.root());

    let circuit = WithdrawCircuit::new(hasher, &notes[0], &path, recipient(), relayer(), 0);
    assert!(is_satisfied(circuit));
}

#[test]
fn test_wrong_note_is_unsatisfied() {
    let (pool, _) = pool_with_notes(2, 4);
    let hasher = PoseidonHasher::new();
    let path = pool.path(0).unwrap();
    let stranger = Note::new(Fr::from(42u64));

    let circuit = WithdrawCircuit::new(hasher, &stranger, &path, recipient(), relayer(), 0);
    assert!(!circuit.is_consistent());
    assert!(!is_satisfied(circuit));
}

#[test]
fn test_nullifier_hash_for_other_index_is_unsatisfied() {
    let (pool, notes) = pool_with_notes(2, 5);
    let hasher = PoseidonHasher::new();
    let path = pool.path(1).unwrap();

    let mut circuit = WithdrawCircuit::new(hasher.clone(), &notes[1], &path, recipient(), relayer(), 0);
    circuit.nullifier_hash = Some(notes[1].nullifier_hash(&hasher, 0));

    assert!(!is_satisfied(circuit));
}

#[test]
fn test_unknown_root_is_unsatisfied() {
    let (pool, notes) = pool_with_notes(2, 6);
    let hasher = PoseidonHasher::new();
    let path = pool.path(0).unwrap();

    let mut circuit = WithdrawCircuit::new(hasher, &notes[0], &path, recipient(), relayer(), 0);
    circuit.root = Some(Fr::from(1u64));

    assert!(!is_satisfied(circuit));
}

#[test]
fn test_empty_circuit_shape() {
    let circuit = WithdrawCircuit::empty(PoseidonHasher::new(), HEIGHT as usize);
    assert_eq!(circuit.height(), HEIGHT as usize);
    assert!(circuit.public_inputs().is_none());
    assert!(!circuit.is_consistent());
}

#[test]
fn test_constraint_count() {
    let (pool, notes) = pool_with_notes(1, 7);
    let path = pool.path(0).unwrap();
    let circuit = WithdrawCircuit::new(
        PoseidonHasher::new(),
        &notes[0],
        &path,
        recipient(),
        relayer(),
        0,
    );

    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.generate_constraints(cs.clone()).unwrap();

    let num_constraints = cs.num_constraints();
    println!("Withdraw circuit constraints (height {}): {}", HEIGHT, num_constraints);

    // HEIGHT + 3 Poseidon hashes dominate
    assert!(num_constraints > 200 * (HEIGHT as usize + 3));
    assert!(num_constraints < 400 * (HEIGHT as usize + 3));
}
