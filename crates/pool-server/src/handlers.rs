//! HTTP request handlers.

use ark_bn254::Fr;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use mixer_circuits::Note;
use mixer_core::{fr_from_hex, fr_to_hex, Address, Release, WithdrawRequest};
use mixer_prover::{prove_withdraw, ProveError};

use crate::error::ApiError;
use crate::state::SharedState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn parse_fr(hex: &str) -> Result<Fr, ApiError> {
    Ok(fr_from_hex(hex)?)
}

fn parse_address(hex: &str) -> Result<Address, ApiError> {
    Ok(hex.parse::<Address>()?)
}

fn parse_amount(value: &str) -> Result<u128, ApiError> {
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid amount {value:?}: {e}")))
}

fn parse_bytes(hex: &str) -> Result<Vec<u8>, ApiError> {
    hex::decode(hex.trim_start_matches("0x"))
        .map_err(|e| ApiError::BadRequest(format!("Invalid hex: {}", e)))
}

// ============ Pool ============

#[derive(Serialize)]
pub struct PoolInfo {
    pub height: u32,
    pub size: u64,
    pub capacity: u64,
    pub root: String,
    pub denomination: String,
    pub known_roots: usize,
    pub spent: usize,
}

pub async fn pool_info(State(state): State<SharedState>) -> Json<PoolInfo> {
    let state = state.read().await;
    let pool = &state.pool;

    Json(PoolInfo {
        height: pool.config().height,
        size: pool.size(),
        capacity: pool.capacity(),
        root: fr_to_hex(&pool.root()),
        denomination: pool.config().denomination.to_string(),
        known_roots: pool.roots().len(),
        spent: pool.nullifiers().len(),
    })
}

// ============ Deposit ============

#[derive(Deserialize)]
pub struct DepositBody {
    pub commitment: String,
}

#[derive(Serialize)]
pub struct DepositResponse {
    pub index: u64,
    pub root: String,
}

pub async fn deposit(
    State(state): State<SharedState>,
    Json(body): Json<DepositBody>,
) -> Result<Json<DepositResponse>, ApiError> {
    let commitment = parse_fr(&body.commitment)?;

    let mut state = state.write().await;
    let receipt = state.pool.deposit(commitment)?;
    if let Err(e) = state.persist() {
        tracing::error!(error = %e, "failed to save state after deposit");
    }

    Ok(Json(DepositResponse {
        index: receipt.index,
        root: fr_to_hex(&receipt.root),
    }))
}

// ============ Queries ============

#[derive(Serialize)]
pub struct PathResponse {
    pub index: u64,
    pub root: String,
    pub siblings: Vec<String>,
    /// `true` where the node on the path is a right child
    pub directions: Vec<bool>,
}

pub async fn merkle_path(
    State(state): State<SharedState>,
    Path(index): Path<u64>,
) -> Result<Json<PathResponse>, ApiError> {
    let path = state.read().await.pool.path(index)?;

    Ok(Json(PathResponse {
        index: path.index(),
        root: fr_to_hex(&path.root()),
        siblings: path.siblings().iter().map(fr_to_hex).collect(),
        directions: path.directions().to_vec(),
    }))
}

#[derive(Serialize)]
pub struct RootResponse {
    pub root: String,
    pub known: bool,
    /// Position in the root history, 0 being the empty tree
    pub position: Option<usize>,
}

pub async fn root_status(
    State(state): State<SharedState>,
    Path(root): Path<String>,
) -> Result<Json<RootResponse>, ApiError> {
    let root = parse_fr(&root)?;
    let position = state.read().await.pool.roots().position(&root);

    Ok(Json(RootResponse {
        root: fr_to_hex(&root),
        known: position.is_some(),
        position,
    }))
}

#[derive(Serialize)]
pub struct NullifierResponse {
    pub nullifier_hash: String,
    pub spent: bool,
}

pub async fn nullifier_status(
    State(state): State<SharedState>,
    Path(hash): Path<String>,
) -> Result<Json<NullifierResponse>, ApiError> {
    let nullifier_hash = parse_fr(&hash)?;
    let spent = state.read().await.pool.is_spent(&nullifier_hash);

    Ok(Json(NullifierResponse {
        nullifier_hash: fr_to_hex(&nullifier_hash),
        spent,
    }))
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: String,
}

pub async fn balance(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let address = parse_address(&address)?;
    let balance = state.read().await.ledger.balance(&address);

    Ok(Json(BalanceResponse {
        address: address.to_string(),
        balance: balance.to_string(),
    }))
}

// ============ Withdraw ============

/// Withdrawal as submitted over the wire. Also returned by the prove endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawBody {
    pub proof: String,
    pub root: String,
    pub nullifier_hash: String,
    pub recipient: String,
    pub relayer: String,
    /// Decimal string
    pub fee: String,
}

impl WithdrawBody {
    fn to_request(&self) -> Result<WithdrawRequest, ApiError> {
        Ok(WithdrawRequest {
            proof: parse_bytes(&self.proof)?,
            root: parse_fr(&self.root)?,
            nullifier_hash: parse_fr(&self.nullifier_hash)?,
            recipient: parse_address(&self.recipient)?,
            relayer: parse_address(&self.relayer)?,
            fee: parse_amount(&self.fee)?,
        })
    }

    fn from_request(request: &WithdrawRequest) -> Self {
        Self {
            proof: format!("0x{}", hex::encode(&request.proof)),
            root: fr_to_hex(&request.root),
            nullifier_hash: fr_to_hex(&request.nullifier_hash),
            recipient: request.recipient.to_string(),
            relayer: request.relayer.to_string(),
            fee: request.fee.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ReleaseResponse {
    pub recipient: String,
    pub relayer: String,
    pub fee: String,
    /// Amount credited to the recipient
    pub amount: Option<String>,
}

impl From<Release> for ReleaseResponse {
    fn from(release: Release) -> Self {
        Self {
            recipient: release.recipient.to_string(),
            relayer: release.relayer.to_string(),
            fee: release.fee.to_string(),
            amount: release.recipient_amount().map(|a| a.to_string()),
        }
    }
}

pub async fn withdraw(
    State(state): State<SharedState>,
    Json(body): Json<WithdrawBody>,
) -> Result<Json<ReleaseResponse>, ApiError> {
    let request = body.to_request()?;

    // Pairing checks run on the blocking pool under a shared lock
    let admission = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.blocking_read().pool.admit(&request))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??
    };

    let mut guard = state.write().await;
    let app = &mut *guard;
    let release = app.pool.commit_with(admission, &mut app.ledger)?;
    if let Err(e) = app.persist() {
        tracing::error!(error = %e, "failed to save state after withdrawal");
    }

    Ok(Json(release.into()))
}

// ============ Prove ============

#[derive(Deserialize)]
pub struct ProveBody {
    /// Note nullifier, hex
    pub note: String,
    pub index: u64,
    pub recipient: String,
    pub relayer: String,
    /// Decimal string
    pub fee: String,
}

#[derive(Serialize)]
pub struct ProveResponse {
    #[serde(flatten)]
    pub withdraw: WithdrawBody,
    pub public_inputs: Vec<String>,
}

pub async fn prove(
    State(state): State<SharedState>,
    Json(body): Json<ProveBody>,
) -> Result<Json<ProveResponse>, ApiError> {
    let note = Note::from_hex(&body.note)?;
    let recipient = parse_address(&body.recipient)?;
    let relayer = parse_address(&body.relayer)?;
    let fee = parse_amount(&body.fee)?;

    let (path, keys, hasher) = {
        let state = state.read().await;
        (
            state.pool.path(body.index)?,
            state.keys.clone(),
            state.hasher.clone(),
        )
    };

    let proof = tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::from_entropy();
        prove_withdraw(&keys, &hasher, &note, &path, recipient, relayer, fee, &mut rng)
    })
    .await
    .map_err(|e| ProveError::ProofGeneration(e.to_string()))??;

    let request = proof.to_withdraw_request()?;
    Ok(Json(ProveResponse {
        withdraw: WithdrawBody::from_request(&request),
        public_inputs: proof.field_inputs().iter().map(fr_to_hex).collect(),
    }))
}
