//! Idempotency middleware.
//!
//! Intercepts mutating (POST) requests, fingerprints the body, and asks
//! the guard whether this `(endpoint, key, body)` triple was seen before.
//! Read requests pass through untouched.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::http::server::AppState;
use crate::idempotency::hash_body;

/// Header carrying the client-supplied idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

pub async fn idempotency_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if req.method() != Method::POST {
        return Ok(next.run(req).await);
    }

    let key = req
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::InvalidInput("Idempotency-Key header missing".into()))?;

    // The concrete request path scopes the key, so the same key on
    // /configs and /configGroups names two unrelated records.
    let endpoint = req.uri().path().to_owned();

    // Buffer the body for hashing, then hand the handler an equivalent
    // request carrying the same bytes.
    let (parts, body) = req.into_parts();
    let bytes: Bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|err| ApiError::Internal(format!("error reading request body: {}", err)))?;

    state
        .guard
        .check_and_set(&endpoint, &key, &hash_body(&bytes))
        .await?;

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}
