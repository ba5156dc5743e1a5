/*
 * Responsibility
 * - GET/PUT /settings/{group}
 * - Saving a group is the cache invalidation trigger: every header family
 *   that reads the group is dropped from the cache and recompiled lazily
 */
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Map, Value};

use crate::{
    api::v1::dto::settings::{SaveGroupResponse, validate_group_name},
    error::AppError,
    settings::SettingsError,
    state::AppState,
};

pub async fn get_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<Map<String, Value>>, AppError> {
    state
        .settings
        .group(&group)
        .map(Json)
        .ok_or(AppError::not_found("settings group"))
}

pub async fn save_group(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<SaveGroupResponse>, AppError> {
    validate_group_name(&group).map_err(|m| AppError::bad_request("INVALID_GROUP", m))?;

    let Value::Object(entries) = body else {
        return Err(SettingsError::NotAnObject(group).into());
    };

    state.settings.replace_group(&group, entries);
    let invalidated = state
        .headers
        .invalidate_group(&group)
        .await
        .iter()
        .map(|f| f.cache_key())
        .collect();

    Ok(Json(SaveGroupResponse { group, invalidated }))
}
