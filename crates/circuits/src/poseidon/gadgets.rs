//! Poseidon R1CS gadgets for in-circuit hashing.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Hash two field elements in-circuit.
pub fn poseidon_hash_two_var(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, config);
    sponge.absorb(a)?;
    sponge.absorb(b)?;
    let result = sponge.squeeze_field_elements(1)?;
    Ok(result[0].clone())
}

/// Hash multiple field elements in-circuit.
pub fn poseidon_hash_many_var(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, config);
    for input in inputs {
        sponge.absorb(input)?;
    }
    let result = sponge.squeeze_field_elements(1)?;
    Ok(result[0].clone())
}
