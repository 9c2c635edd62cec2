//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use mixer_core::{ParseError, PoolError};
use mixer_prover::ProveError;

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable machine-readable code
    pub kind: &'static str,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Prove(#[from] ProveError),
    #[error("{0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pool(err) => match err {
                PoolError::CapacityExceeded { .. } => StatusCode::INSUFFICIENT_STORAGE,
                PoolError::UnknownIndex { .. } => StatusCode::NOT_FOUND,
                PoolError::UnknownRoot | PoolError::InvalidProof => StatusCode::UNPROCESSABLE_ENTITY,
                PoolError::AlreadySpent => StatusCode::CONFLICT,
                PoolError::TransferRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PoolError::InvalidConfig(_) | PoolError::Snapshot(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Prove(ProveError::InvalidWitness(_)) => StatusCode::BAD_REQUEST,
            ApiError::Prove(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Pool(err) => err.kind(),
            ApiError::Prove(ProveError::InvalidWitness(_)) => "invalid_witness",
            ApiError::Prove(_) => "prover_error",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_statuses() {
        let cases = [
            (PoolError::UnknownRoot, StatusCode::UNPROCESSABLE_ENTITY),
            (PoolError::InvalidProof, StatusCode::UNPROCESSABLE_ENTITY),
            (PoolError::AlreadySpent, StatusCode::CONFLICT),
            (
                PoolError::CapacityExceeded { capacity: 4 },
                StatusCode::INSUFFICIENT_STORAGE,
            ),
            (
                PoolError::UnknownIndex { index: 9, size: 2 },
                StatusCode::NOT_FOUND,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_parse_error_is_bad_request() {
        let err = ApiError::from(ParseError::NonCanonical);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "bad_request");
    }

    #[test]
    fn test_internal_error_is_server_error() {
        let err = ApiError::Internal("task panicked".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "internal");
    }
}
