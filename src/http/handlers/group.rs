//! Handlers for config group endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::http::handlers::{parse_json, parse_version};
use crate::http::response::{message, Message};
use crate::http::server::AppState;
use crate::labels::LabelQuery;
use crate::model::{Config, ConfigGroup};

/// POST /configGroups
///
/// Create a group. Members not yet present in the standalone keyspace are
/// inserted there first so they can be looked up independently.
pub async fn add_config_group(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ConfigGroup>, ApiError> {
    let group: ConfigGroup = parse_json(&body)?;
    state.store.add_config_group(&group).await?;
    tracing::info!(
        name = %group.name,
        version = group.version,
        members = group.configurations.len(),
        "config group created"
    );
    Ok(Json(group))
}

/// GET /configGroups/{name}/{version}
pub async fn get_config_group(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> Result<Json<ConfigGroup>, ApiError> {
    let version = parse_version(&version)?;
    let group = state.store.get_config_group(&name, version).await?;
    Ok(Json(group))
}

/// DELETE /configGroups/{name}/{version}
pub async fn delete_config_group(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> Result<Json<Message>, ApiError> {
    let version = parse_version(&version)?;
    state.store.delete_config_group(&name, version).await?;
    tracing::info!(name = %name, version, "config group deleted");
    Ok(message("Configuration group successfully deleted"))
}

/// POST /configGroups/{name}/{version}
///
/// Append a config to a group's membership.
pub async fn add_config_to_group(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Config>, ApiError> {
    let version = parse_version(&version)?;
    let config: Config = parse_json(&body)?;
    config.validate()?;
    state
        .store
        .add_config_to_group(&name, version, config.clone())
        .await?;
    tracing::info!(
        group = %name,
        group_version = version,
        member = %config.name,
        member_version = config.version,
        "config added to group"
    );
    Ok(Json(config))
}

/// DELETE /configGroups/{groupName}/{groupVersion}/{configName}/{configVersion}
pub async fn delete_config_from_group(
    State(state): State<AppState>,
    Path((group_name, group_version, config_name, config_version)): Path<(
        String,
        String,
        String,
        String,
    )>,
) -> Result<Json<Message>, ApiError> {
    let group_version = parse_version(&group_version)?;
    let config_version = parse_version(&config_version)?;
    state
        .store
        .delete_config_from_group(&group_name, group_version, &config_name, config_version)
        .await?;
    Ok(message("Configuration successfully removed from group"))
}

/// GET /configGroups/{groupName}/{groupVersion}/{labels}
///
/// Return the members whose label set equals the query exactly.
pub async fn get_configs_by_label(
    State(state): State<AppState>,
    Path((group_name, group_version, labels)): Path<(String, String, String)>,
) -> Result<Json<Vec<Config>>, ApiError> {
    let group_version = parse_version(&group_version)?;
    let query = LabelQuery::parse(&labels)?;
    let configs = state
        .store
        .get_configs_from_group_by_label(&group_name, group_version, &query)
        .await?;
    Ok(Json(configs))
}

/// DELETE /configGroups/{groupName}/{groupVersion}/{labels}
///
/// Remove every member whose label set equals the query exactly.
pub async fn delete_configs_by_label(
    State(state): State<AppState>,
    Path((group_name, group_version, labels)): Path<(String, String, String)>,
) -> Result<Json<Message>, ApiError> {
    let group_version = parse_version(&group_version)?;
    let query = LabelQuery::parse(&labels)?;
    state
        .store
        .delete_configs_from_group_by_label(&group_name, group_version, &query)
        .await?;
    Ok(message("Configurations successfully deleted from group"))
}
