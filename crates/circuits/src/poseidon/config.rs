//! Poseidon configuration for BN254.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::{batch_inversion, Field, PrimeField};

/// Number of full rounds (beginning + end)
pub const FULL_ROUNDS: usize = 8;

/// Number of partial rounds
pub const PARTIAL_ROUNDS: usize = 57;

/// S-box exponent
pub const ALPHA: u64 = 5;

/// Field elements absorbed per permutation
pub const RATE: usize = 2;

const CAPACITY: usize = 1;
const WIDTH: usize = RATE + CAPACITY;

/// Seed for the round constants.
const DOMAIN: &[u8] = b"mixer.poseidon.bn254.t3";

/// Build the Poseidon configuration used across the workspace.
///
/// Width 3 (rate 2, capacity 1), x^5 S-box, 8 full and 57 partial rounds.
/// The MDS matrix is a Cauchy matrix and the round constants come from a
/// fixed seed, so every call yields the same parameters.
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    PoseidonConfig::new(
        FULL_ROUNDS,
        PARTIAL_ROUNDS,
        ALPHA,
        cauchy_mds(),
        round_constants(),
        RATE,
        CAPACITY,
    )
}

/// `mds[i][j] = 1 / (x_i + y_j)` with `x_i = i` and `y_j = WIDTH + j`.
fn cauchy_mds() -> Vec<Vec<Fr>> {
    let mut entries: Vec<Fr> = (0..WIDTH)
        .flat_map(|i| (0..WIDTH).map(move |j| Fr::from((i + j + WIDTH) as u64)))
        .collect();
    batch_inversion(&mut entries);

    entries.chunks(WIDTH).map(<[Fr]>::to_vec).collect()
}

fn round_constants() -> Vec<Vec<Fr>> {
    let num_rounds = FULL_ROUNDS + PARTIAL_ROUNDS;
    let mut ark = Vec::with_capacity(num_rounds);

    let mut state = Fr::from_be_bytes_mod_order(DOMAIN);
    let mut counter = 0u64;

    for _ in 0..num_rounds {
        let mut round = Vec::with_capacity(WIDTH);
        for _ in 0..WIDTH {
            counter += 1;
            state = (state + Fr::from(counter)).pow([ALPHA]);
            round.push(state);
        }
        ark.push(round);
    }

    ark
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, Zero};

    #[test]
    fn test_config_shape() {
        let config = poseidon_config();
        assert_eq!(config.full_rounds, FULL_ROUNDS);
        assert_eq!(config.partial_rounds, PARTIAL_ROUNDS);
        assert_eq!(config.alpha, ALPHA);
        assert_eq!(config.rate, RATE);
        assert_eq!(config.capacity, CAPACITY);
        assert_eq!(config.mds.len(), WIDTH);
        assert!(config.mds.iter().all(|row| row.len() == WIDTH));
        assert_eq!(config.ark.len(), FULL_ROUNDS + PARTIAL_ROUNDS);
    }

    #[test]
    fn test_mds_entries() {
        let mds = cauchy_mds();
        // 1 / (0 + 3)
        assert_eq!(mds[0][0] * Fr::from(3u64), Fr::one());
        // 1 / (2 + 5)
        assert_eq!(mds[2][2] * Fr::from(7u64), Fr::one());
    }

    #[test]
    fn test_round_constants_are_stable() {
        let a = round_constants();
        let b = round_constants();
        assert_eq!(a, b);
        assert!(a.iter().flatten().all(|c| !c.is_zero()));
        assert_ne!(a[0][0], a[0][1]);
    }
}
