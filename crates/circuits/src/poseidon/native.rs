//! Native Poseidon hash functions (outside circuits).

use std::sync::Arc;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::CryptographicSponge;
use mixer_core::Hash2;

use super::config::poseidon_config;

/// Hash two field elements.
pub fn poseidon_hash_two(config: &PoseidonConfig<Fr>, a: Fr, b: Fr) -> Fr {
    let mut sponge = PoseidonSponge::new(config);
    sponge.absorb(&a);
    sponge.absorb(&b);
    sponge.squeeze_field_elements(1)[0]
}

/// Hash multiple field elements.
pub fn poseidon_hash_many(config: &PoseidonConfig<Fr>, inputs: &[Fr]) -> Fr {
    let mut sponge = PoseidonSponge::new(config);
    for input in inputs {
        sponge.absorb(input);
    }
    sponge.squeeze_field_elements(1)[0]
}

/// Two-to-one Poseidon hash used for tree nodes and note derivation.
///
/// Cloning is cheap; the parameters are shared.
#[derive(Clone, Debug)]
pub struct PoseidonHasher {
    config: Arc<PoseidonConfig<Fr>>,
}

impl PoseidonHasher {
    pub fn new() -> Self {
        Self::with_config(poseidon_config())
    }

    pub fn with_config(config: PoseidonConfig<Fr>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PoseidonConfig<Fr> {
        &self.config
    }

    pub fn hash_many(&self, inputs: &[Fr]) -> Fr {
        poseidon_hash_many(&self.config, inputs)
    }
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hash2 for PoseidonHasher {
    fn hash_two(&self, left: Fr, right: Fr) -> Fr {
        poseidon_hash_two(&self.config, left, right)
    }
}
