//! Shared server state: the pool, its keys and the payout ledger.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ark_std::rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use mixer_circuits::PoseidonHasher;
use mixer_core::{
    fr_to_hex, Address, AssetTransfer, EventSink, Pool, PoolConfig, PoolError, PoolEvent,
    PoolSnapshot, Release,
};
use mixer_prover::{load_or_setup, Groth16Verifier, SetupError, VerifyError, WithdrawKeys};

use crate::config::ServerConfig;

pub type ServerPool = Pool<PoseidonHasher, Groth16Verifier>;

/// Application state shared across handlers
pub type SharedState = Arc<RwLock<AppState>>;

/// Errors while bringing the server up
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error(transparent)]
    StateFile(#[from] StateFileError),
}

#[derive(Error, Debug)]
pub enum StateFileError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt state file: {0}")]
    Corrupt(String),
}

/// On-disk server state. Pool and balances share one file so a withdrawal
/// is never saved as spent without its payout.
#[derive(Serialize, Deserialize)]
struct StateFile {
    /// Hex of the encoded pool snapshot
    pool: String,
    /// Address to decimal balance
    balances: BTreeMap<String, String>,
}

/// Read a state file written by [`AppState::persist`].
pub fn read_state_file(path: &Path) -> Result<(PoolSnapshot, Ledger), StateFileError> {
    let file: StateFile = serde_json::from_slice(&std::fs::read(path)?)?;

    let bytes = hex::decode(&file.pool).map_err(|e| StateFileError::Corrupt(e.to_string()))?;
    let snapshot = PoolSnapshot::from_bytes(&bytes)?;
    let ledger = Ledger::from_balances(&file.balances)?;

    Ok((snapshot, ledger))
}

pub struct AppState {
    pub pool: ServerPool,
    pub keys: Arc<WithdrawKeys>,
    pub hasher: PoseidonHasher,
    pub ledger: Ledger,
    pub state_file: Option<PathBuf>,
}

impl AppState {
    /// Build state from already loaded keys. Restores from `state_file` if it exists.
    pub fn new(
        config: PoolConfig,
        keys: WithdrawKeys,
        state_file: Option<PathBuf>,
    ) -> Result<Self, StartupError> {
        let hasher = PoseidonHasher::new();
        let verifier = Groth16Verifier::new(&keys.pair.verifying_key)?;

        let (pool, ledger) = match state_file.as_deref().filter(|path| path.exists()) {
            Some(path) => {
                tracing::info!(path = %path.display(), "restoring server state");
                let (snapshot, ledger) = read_state_file(path)?;
                let pool = Pool::restore(config, hasher.clone(), verifier, snapshot)?;
                (pool, ledger)
            }
            None => (Pool::new(config, hasher.clone(), verifier)?, Ledger::default()),
        };

        Ok(Self {
            pool: pool.with_event_sink(TracingSink),
            keys: Arc::new(keys),
            hasher,
            ledger,
            state_file,
        })
    }

    /// Load or generate keys, then build state.
    pub fn bootstrap(config: &ServerConfig) -> Result<Self, StartupError> {
        let pool_config = config.pool_config()?;
        let mut rng = StdRng::from_entropy();
        let keys = load_or_setup(&config.keys_dir, pool_config.height, &mut rng)?;

        Self::new(pool_config, keys, config.state_file.clone())
    }

    /// Write the pool snapshot and ledger to the state file, if one is configured.
    ///
    /// The file is written next to the target and renamed over it, so a
    /// crash never leaves a truncated file behind.
    pub fn persist(&self) -> Result<(), StateFileError> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };

        let file = StateFile {
            pool: hex::encode(self.pool.snapshot().to_bytes()?),
            balances: self.ledger.to_balances(),
        };
        let bytes = serde_json::to_vec(&file)?;
        write_atomic(path, &bytes)?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "state saved");
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(tmp, path)
}

/// Logs every pool event.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: &PoolEvent) {
        match event {
            PoolEvent::DepositRecorded {
                commitment,
                index,
                root,
            } => tracing::info!(
                commitment = %fr_to_hex(commitment),
                index,
                root = %fr_to_hex(root),
                "Deposit"
            ),
            PoolEvent::WithdrawalRecorded {
                nullifier_hash,
                recipient,
                relayer,
                fee,
            } => tracing::info!(
                nullifier_hash = %fr_to_hex(nullifier_hash),
                %recipient,
                %relayer,
                fee = %fee,
                "Withdrawal"
            ),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("fee {fee} exceeds denomination {denomination}")]
    FeeTooHigh { fee: u128, denomination: u128 },
    #[error("balance overflow for {0}")]
    Overflow(Address),
}

/// Balances credited by withdrawals. Saved alongside the pool snapshot.
#[derive(Debug, Default)]
pub struct Ledger {
    balances: BTreeMap<Address, u128>,
}

impl Ledger {
    pub fn balance(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    fn to_balances(&self) -> BTreeMap<String, String> {
        self.balances
            .iter()
            .map(|(address, amount)| (address.to_string(), amount.to_string()))
            .collect()
    }

    fn from_balances(entries: &BTreeMap<String, String>) -> Result<Self, StateFileError> {
        let mut balances = BTreeMap::new();
        for (address, amount) in entries {
            let address = address
                .parse::<Address>()
                .map_err(|e| StateFileError::Corrupt(format!("address {address:?}: {e}")))?;
            let amount = amount
                .parse::<u128>()
                .map_err(|e| StateFileError::Corrupt(format!("balance {amount:?}: {e}")))?;
            balances.insert(address, amount);
        }
        Ok(Self { balances })
    }
}

impl AssetTransfer for Ledger {
    type Error = LedgerError;

    fn transfer(&mut self, release: &Release) -> Result<(), Self::Error> {
        let amount = release.recipient_amount().ok_or(LedgerError::FeeTooHigh {
            fee: release.fee,
            denomination: release.denomination,
        })?;

        // Compute both balances before touching the map
        let recipient_balance = self
            .balance(&release.recipient)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(release.recipient))?;
        let relayer_balance = if release.relayer == release.recipient {
            recipient_balance.checked_add(release.fee)
        } else {
            self.balance(&release.relayer).checked_add(release.fee)
        }
        .ok_or(LedgerError::Overflow(release.relayer))?;

        self.balances.insert(release.recipient, recipient_balance);
        if release.fee > 0 || release.relayer == release.recipient {
            self.balances.insert(release.relayer, relayer_balance);
        }
        Ok(())
    }
}
