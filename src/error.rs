//! Error taxonomy for the registry.
//!
//! Every fallible layer (store, guard, handlers) returns [`ApiError`]
//! directly; the HTTP boundary maps each kind to a status code
//! mechanically. No layer inspects error message content.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the registry core.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input: bad JSON, empty required fields,
    /// unparseable version or label query, missing idempotency key.
    #[error("{0}")]
    InvalidInput(String),

    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A conflicting entity already exists under the same identity.
    #[error("{0}")]
    AlreadyExists(String),

    /// The idempotency guard saw this exact request before.
    #[error("Duplicate request with same body.")]
    Duplicate,

    /// Serialization failure or a fault in the underlying store.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) | ApiError::Duplicate => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InvalidInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::AlreadyExists("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::Duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
