//! API route definitions.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::SharedState;

/// Create API routes
pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Pool state
        .route("/api/pool", get(handlers::pool_info))
        .route("/api/path/:index", get(handlers::merkle_path))
        .route("/api/roots/:root", get(handlers::root_status))
        .route("/api/nullifiers/:hash", get(handlers::nullifier_status))
        .route("/api/balances/:address", get(handlers::balance))
        // Mutations
        .route("/api/deposit", post(handlers::deposit))
        .route("/api/withdraw", post(handlers::withdraw))
        // Relayer convenience
        .route("/api/prove/withdraw", post(handlers::prove))
}
