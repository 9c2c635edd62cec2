//! Deposit/withdraw protocol.
//!
//! A `Pool` is the explicitly owned context for one deployed tree and its
//! nullifier registry. Lifecycle per note:
//! - `Unspent`: commitment deposited, no successful withdrawal yet
//! - `Spent`: its nullifier hash is in the registry (terminal)
//!
//! Mutating operations take `&mut self` and are written as if
//! single-threaded; hosts that share a pool across threads must serialize
//! them (see `mixer-pool-server` for a read/write lock embedding).

use ark_bn254::Fr;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::events::{EventSink, PoolEvent};
use crate::field::{fr_to_hex, Address};
use crate::hasher::Hash2;
use crate::history::RootHistory;
use crate::nullifier::NullifierRegistry;
use crate::path::MerklePath;
use crate::snapshot::PoolSnapshot;
use crate::tree::MerkleEngine;
use crate::verifier::{ProofVerifier, PublicInputs};

/// Arguments of a withdrawal, as submitted by the withdrawer or a relayer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub proof: Vec<u8>,
    pub root: Fr,
    pub nullifier_hash: Fr,
    pub recipient: Address,
    pub relayer: Address,
    pub fee: u128,
}

impl WithdrawRequest {
    /// The exact public-input tuple the proof is checked against.
    pub fn public_inputs(&self) -> PublicInputs {
        PublicInputs {
            root: self.root,
            nullifier_hash: self.nullifier_hash,
            recipient: self.recipient,
            relayer: self.relayer,
            fee: self.fee,
        }
    }
}

/// Result of a successful deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    pub commitment: Fr,
    pub index: u64,
    /// Root after the insertion
    pub root: Fr,
}

/// Funds to release after a successful withdrawal.
///
/// The pool only forwards `fee`; bounding it against the denomination is
/// the asset-transfer collaborator's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Release {
    pub recipient: Address,
    pub relayer: Address,
    pub fee: u128,
    pub denomination: u128,
}

impl Release {
    /// Amount owed to the recipient, `None` if the fee exceeds the denomination.
    pub fn recipient_amount(&self) -> Option<u128> {
        self.denomination.checked_sub(self.fee)
    }
}

/// A withdrawal that passed the root, nullifier and proof checks.
///
/// Only [`Pool::admit`] creates one, and [`Pool::commit`] consumes it.
#[derive(Debug)]
pub struct Admission {
    inputs: PublicInputs,
}

impl Admission {
    pub fn public_inputs(&self) -> &PublicInputs {
        &self.inputs
    }
}

/// Host-side transfer of the released funds.
pub trait AssetTransfer {
    type Error: std::fmt::Display;

    /// Pay out `release`. Must either fully succeed or change nothing.
    fn transfer(&mut self, release: &Release) -> Result<(), Self::Error>;
}

/// One privacy pool: commitment tree, root history and nullifier registry.
pub struct Pool<H, V> {
    config: PoolConfig,
    tree: MerkleEngine<H>,
    roots: RootHistory,
    nullifiers: NullifierRegistry,
    verifier: V,
    sink: Option<Box<dyn EventSink + Send + Sync>>,
}

impl<H: Hash2, V: ProofVerifier> Pool<H, V> {
    /// Create an empty pool. The empty-tree root is history entry 0.
    pub fn new(config: PoolConfig, hasher: H, verifier: V) -> Result<Self, PoolError> {
        config.validate()?;

        let tree = MerkleEngine::new(hasher, config.height, config.empty_leaf)?;
        let mut roots = RootHistory::new();
        roots.append(tree.root());

        Ok(Self {
            config,
            tree,
            roots,
            nullifiers: NullifierRegistry::new(),
            verifier,
            sink: None,
        })
    }

    /// Forward every future event to `sink`.
    pub fn with_event_sink(mut self, sink: impl EventSink + Send + Sync + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Insert a commitment and record the new root.
    pub fn deposit(&mut self, commitment: Fr) -> Result<DepositReceipt, PoolError> {
        let index = self.tree.insert(commitment)?;
        let root = self.tree.root();
        self.roots.append(root);

        tracing::info!(index, root = %fr_to_hex(&root), "deposit recorded");
        self.emit(PoolEvent::DepositRecorded {
            commitment,
            index,
            root,
        });

        Ok(DepositReceipt {
            commitment,
            index,
            root,
        })
    }

    /// Run the withdrawal checks without changing any state.
    ///
    /// Checks run in a fixed order so callers can tell the outcomes apart:
    /// unknown root, then already spent, then invalid proof.
    pub fn admit(&self, request: &WithdrawRequest) -> Result<Admission, PoolError> {
        let result = self.check(request);
        if let Err(err) = &result {
            tracing::warn!(
                kind = err.kind(),
                nullifier_hash = %fr_to_hex(&request.nullifier_hash),
                "withdrawal rejected"
            );
        }
        result
    }

    fn check(&self, request: &WithdrawRequest) -> Result<Admission, PoolError> {
        let inputs = request.public_inputs();
        self.recheck(&inputs)?;

        if !self.verifier.verify(&inputs, &request.proof) {
            return Err(PoolError::InvalidProof);
        }

        Ok(Admission { inputs })
    }

    /// Consume the nullifier of an admitted withdrawal.
    ///
    /// The nullifier is checked again here: if another withdrawal with the
    /// same nullifier hash was committed after `admission` was issued, this
    /// one fails with `AlreadySpent`.
    pub fn commit(&mut self, admission: Admission) -> Result<Release, PoolError> {
        let inputs = admission.inputs;
        self.recheck(&inputs)?;
        self.nullifiers.insert(inputs.nullifier_hash)?;

        tracing::info!(
            nullifier_hash = %fr_to_hex(&inputs.nullifier_hash),
            recipient = %inputs.recipient,
            relayer = %inputs.relayer,
            fee = %inputs.fee,
            "withdrawal recorded"
        );
        self.emit(PoolEvent::WithdrawalRecorded {
            nullifier_hash: inputs.nullifier_hash,
            recipient: inputs.recipient,
            relayer: inputs.relayer,
            fee: inputs.fee,
        });

        Ok(self.release_for(&inputs))
    }

    /// Commit an admitted withdrawal, paying out through `transfer` first.
    ///
    /// The transfer runs after the nullifier is checked again and before it
    /// is consumed. If it fails nothing is recorded and the note stays unspent.
    pub fn commit_with<T: AssetTransfer>(
        &mut self,
        admission: Admission,
        transfer: &mut T,
    ) -> Result<Release, PoolError> {
        self.recheck(&admission.inputs)?;

        let release = self.release_for(&admission.inputs);
        if let Err(e) = transfer.transfer(&release) {
            tracing::warn!(error = %e, "asset transfer rejected");
            return Err(PoolError::TransferRejected(e.to_string()));
        }

        self.commit(admission)
    }

    fn recheck(&self, inputs: &PublicInputs) -> Result<(), PoolError> {
        if !self.roots.contains(&inputs.root) {
            return Err(PoolError::UnknownRoot);
        }
        if self.nullifiers.contains(&inputs.nullifier_hash) {
            return Err(PoolError::AlreadySpent);
        }
        Ok(())
    }

    /// Admit and commit in one step.
    pub fn withdraw(&mut self, request: &WithdrawRequest) -> Result<Release, PoolError> {
        let admission = self.admit(request)?;
        self.commit(admission)
    }

    /// Withdraw and pay out through `transfer` as one all-or-nothing step.
    pub fn withdraw_and_transfer<T: AssetTransfer>(
        &mut self,
        request: &WithdrawRequest,
        transfer: &mut T,
    ) -> Result<Release, PoolError> {
        let admission = self.admit(request)?;
        self.commit_with(admission, transfer)
    }

    fn release_for(&self, inputs: &PublicInputs) -> Release {
        Release {
            recipient: inputs.recipient,
            relayer: inputs.relayer,
            fee: inputs.fee,
            denomination: self.config.denomination,
        }
    }

    fn emit(&mut self, event: PoolEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.record(&event);
        }
    }

    /// Current tree root.
    pub fn root(&self) -> Fr {
        self.tree.root()
    }

    /// Number of deposits so far.
    pub fn size(&self) -> u64 {
        self.tree.size()
    }

    pub fn capacity(&self) -> u64 {
        self.tree.capacity()
    }

    /// Authentication path of a deposited leaf against the current root.
    pub fn path(&self, index: u64) -> Result<MerklePath, PoolError> {
        self.tree.path(index)
    }

    pub fn is_known_root(&self, root: &Fr) -> bool {
        self.roots.contains(root)
    }

    pub fn is_spent(&self, nullifier_hash: &Fr) -> bool {
        self.nullifiers.contains(nullifier_hash)
    }

    /// Every root produced so far, oldest first.
    pub fn roots(&self) -> &RootHistory {
        &self.roots
    }

    pub fn nullifiers(&self) -> &NullifierRegistry {
        &self.nullifiers
    }

    pub fn tree(&self) -> &MerkleEngine<H> {
        &self.tree
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Capture the full functional state.
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            height: self.config.height,
            empty_leaf: self.config.empty_leaf,
            size: self.tree.size(),
            filled_subtrees: self.tree.filled_subtrees().to_vec(),
            roots: self.roots.as_slice().to_vec(),
            nullifiers: self.nullifiers.to_sorted_vec(),
            leaves: self.tree.leaves().to_vec(),
        }
    }

    /// Rebuild a pool from a snapshot taken with the same configuration and hasher.
    ///
    /// Leaves are replayed, and the resulting filled subtrees and root
    /// history must match the stored ones exactly. No events are emitted.
    pub fn restore(
        config: PoolConfig,
        hasher: H,
        verifier: V,
        snapshot: PoolSnapshot,
    ) -> Result<Self, PoolError> {
        if snapshot.height != config.height || snapshot.empty_leaf != config.empty_leaf {
            return Err(PoolError::Snapshot(
                "snapshot was taken with a different tree configuration".to_string(),
            ));
        }
        if snapshot.leaves.len() as u64 != snapshot.size {
            return Err(PoolError::Snapshot(format!(
                "size {} does not match {} stored leaves",
                snapshot.size,
                snapshot.leaves.len()
            )));
        }

        let mut pool = Self::new(config, hasher, verifier)?;
        for leaf in &snapshot.leaves {
            pool.tree
                .insert(*leaf)
                .map_err(|e| PoolError::Snapshot(format!("cannot replay leaves: {e}")))?;
            pool.roots.append(pool.tree.root());
        }

        if pool.roots.as_slice() != snapshot.roots.as_slice() {
            return Err(PoolError::Snapshot(
                "root history does not match the stored leaves".to_string(),
            ));
        }
        if pool.tree.filled_subtrees() != snapshot.filled_subtrees.as_slice() {
            return Err(PoolError::Snapshot(
                "filled subtrees do not match the stored leaves".to_string(),
            ));
        }

        for nullifier_hash in snapshot.nullifiers {
            pool.nullifiers
                .insert(nullifier_hash)
                .map_err(|_| PoolError::Snapshot("duplicate nullifier hash".to_string()))?;
        }

        tracing::info!(
            size = pool.size(),
            spent = pool.nullifiers.len(),
            "pool restored from snapshot"
        );
        Ok(pool)
    }
}
