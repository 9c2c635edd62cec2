//! Pool errors.

use thiserror::Error;

/// Errors produced by tree, registry and protocol operations.
///
/// Every variant is reported to the immediate caller and never retried
/// internally. A failed operation leaves all pool state unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The tree holds `2^height` leaves already.
    #[error("merkle tree is full ({capacity} leaves)")]
    CapacityExceeded {
        /// Maximum number of leaves of the tree.
        capacity: u64,
    },

    /// A path was requested for a leaf that was never inserted.
    #[error("leaf index {index} has not been inserted (tree size {size})")]
    UnknownIndex {
        /// Requested leaf index.
        index: u64,
        /// Number of leaves currently in the tree.
        size: u64,
    },

    /// The withdrawal root was never produced by this tree.
    #[error("cannot find your merkle root")]
    UnknownRoot,

    /// The nullifier hash has already been consumed.
    #[error("the note has already been spent")]
    AlreadySpent,

    /// The proof predicate rejected the public inputs/proof pair.
    #[error("invalid withdraw proof")]
    InvalidProof,

    /// Pool configuration is out of range.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(&'static str),

    /// The asset-transfer collaborator refused the release; nothing was spent.
    #[error("asset transfer rejected: {0}")]
    TransferRejected(String),

    /// A persisted snapshot could not be decoded or does not match the configuration.
    #[error("snapshot rejected: {0}")]
    Snapshot(String),
}

impl PoolError {
    /// Stable machine-readable code for this error.
    ///
    /// Relayers use it to decide between regenerating a proof against a fresh
    /// root, abandoning a spent note, or re-checking proof inputs.
    pub fn kind(&self) -> &'static str {
        match self {
            PoolError::CapacityExceeded { .. } => "capacity_exceeded",
            PoolError::UnknownIndex { .. } => "unknown_index",
            PoolError::UnknownRoot => "unknown_root",
            PoolError::AlreadySpent => "already_spent",
            PoolError::InvalidProof => "invalid_proof",
            PoolError::InvalidConfig(_) => "invalid_config",
            PoolError::TransferRejected(_) => "transfer_rejected",
            PoolError::Snapshot(_) => "snapshot",
        }
    }
}

/// Errors from parsing hex-encoded field elements and addresses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("value is not a canonical field element")]
    NonCanonical,
}
