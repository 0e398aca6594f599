//! Request orchestration.
//!
//! Handlers validate input shape, call the entity store, apply the label
//! matcher where relevant, and shape the response. All failures surface
//! as [`crate::error::ApiError`] and map to statuses mechanically.

pub mod config;
pub mod group;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Parse a JSON request body into `T`, reporting malformed JSON as 400.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::InvalidInput(format!("Error parsing JSON: {}", err)))
}

/// Parse a version path segment, reporting failure as 400.
pub(crate) fn parse_version(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::InvalidInput("Invalid version format".into()))
}
