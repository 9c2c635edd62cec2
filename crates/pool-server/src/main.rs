//! HTTP API server hosting one mixer pool.

use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::{Directive, EnvFilter, ParseError};

mod config;
mod error;
mod handlers;
mod routes;
mod state;


use config::ServerConfig;
use state::{AppState, SharedState};

/// Build the application router
pub fn app(state: SharedState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Log filter from `RUST_LOG` (default `info`), with arkworks' `r1cs`
/// target always off.
///
/// The R1CS gadgets carry `#[tracing::instrument(target = "r1cs")]`. With
/// those spans enabled, circuit synthesis slows down by orders of
/// magnitude and key setup at production heights never completes.
pub fn log_filter() -> Result<EnvFilter, ParseError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    Ok(filter.add_directive("r1cs=off".parse::<Directive>()?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(log_filter()?).init();

    let config = ServerConfig::parse();
    tracing::info!(
        height = config.height,
        denomination = %config.denomination,
        keys_dir = %config.keys_dir.display(),
        "starting mixer pool server"
    );

    let state = AppState::bootstrap(&config)?;
    tracing::info!(
        size = state.pool.size(),
        root = %mixer_core::fr_to_hex(&state.pool.root()),
        "pool ready"
    );

    let app = app(Arc::new(RwLock::new(state)));

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(addr = %config.listen, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
