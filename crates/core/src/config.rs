//! Pool configuration.

use ark_bn254::Fr;
use ark_ff::Zero;

use crate::error::PoolError;

/// Largest supported tree height (2^32 leaves).
pub const MAX_HEIGHT: u32 = 32;

/// Height of the deployed pool tree (about one million deposits).
pub const DEFAULT_HEIGHT: u32 = 20;

/// One whole coin in its smallest unit (1e18).
pub const DEFAULT_DENOMINATION: u128 = 1_000_000_000_000_000_000;

/// Immutable parameters of one pool instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Tree height; capacity is `2^height` deposits.
    pub height: u32,
    /// Fixed amount every deposit locks and every withdrawal releases.
    pub denomination: u128,
    /// Value of an unpopulated leaf.
    pub empty_leaf: Fr,
}

impl PoolConfig {
    pub fn new(height: u32, denomination: u128) -> Self {
        Self {
            height,
            denomination,
            empty_leaf: Fr::zero(),
        }
    }

    pub fn with_empty_leaf(mut self, empty_leaf: Fr) -> Self {
        self.empty_leaf = empty_leaf;
        self
    }

    /// Check that the parameters describe a usable pool.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.height > MAX_HEIGHT {
            return Err(PoolError::InvalidConfig("tree height must be at most 32"));
        }
        if self.denomination == 0 {
            return Err(PoolError::InvalidConfig("denomination must be positive"));
        }
        Ok(())
    }

    /// Maximum number of deposits.
    pub fn capacity(&self) -> u64 {
        1u64 << self.height
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HEIGHT, DEFAULT_DENOMINATION)
    }
}
