//! Commitment/nullifier core of a fixed-denomination privacy pool.
//!
//! This crate provides:
//! - `ZeroCache`: empty-subtree hashes for every tree level
//! - `MerkleEngine`: append-only incremental Merkle tree with path queries
//! - `RootHistory`: every root the tree has ever had
//! - `NullifierRegistry`: spent nullifier hashes, inserted exactly once
//! - `Pool`: the deposit/withdraw protocol built on top of them
//!
//! The node hash and the withdraw proof system are injected through the
//! [`Hash2`] and [`ProofVerifier`] traits; this crate picks neither.

pub mod config;
pub mod error;
pub mod events;
pub mod field;
pub mod hasher;
pub mod history;
pub mod nullifier;
pub mod path;
pub mod pool;
pub mod snapshot;
pub mod tree;
pub mod verifier;
pub mod zeros;


pub use config::{PoolConfig, DEFAULT_DENOMINATION, DEFAULT_HEIGHT, MAX_HEIGHT};
pub use error::{ParseError, PoolError};
pub use events::{EventSink, PoolEvent};
pub use field::{fr_from_hex, fr_to_hex, Address};
pub use hasher::Hash2;
pub use history::RootHistory;
pub use nullifier::NullifierRegistry;
pub use path::MerklePath;
pub use pool::{Admission, AssetTransfer, DepositReceipt, Pool, Release, WithdrawRequest};
pub use snapshot::PoolSnapshot;
pub use tree::MerkleEngine;
pub use verifier::{ProofVerifier, PublicInputs};
pub use zeros::ZeroCache;

pub use ark_bn254::Fr;

/// Field every leaf, node, root and nullifier hash lives in.
pub type Field = Fr;
