//! Handlers for standalone config endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::http::handlers::{parse_json, parse_version};
use crate::http::response::{message, Message};
use crate::http::server::AppState;
use crate::model::Config;

/// POST /configs
///
/// Create a config. The idempotency middleware has already admitted the
/// request; the store enforces identity uniqueness atomically.
pub async fn add_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Config>, ApiError> {
    let config: Config = parse_json(&body)?;
    state.store.add_config(&config).await?;
    tracing::info!(name = %config.name, version = config.version, "config created");
    Ok(Json(config))
}

/// GET /configs/{name}/{version}
pub async fn get_config(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> Result<Json<Config>, ApiError> {
    let version = parse_version(&version)?;
    let config = state.store.get_config(&name, version).await?;
    Ok(Json(config))
}

/// DELETE /configs/{name}/{version}
pub async fn delete_config(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> Result<Json<Message>, ApiError> {
    let version = parse_version(&version)?;
    state.store.delete_config(&name, version).await?;
    tracing::info!(name = %name, version, "config deleted");
    Ok(message("Configuration successfully deleted"))
}
