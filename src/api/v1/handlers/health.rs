/*
 * Responsibility
 * - GET /health (liveness)
 * - also reports which header cache backend is in use
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::services::cache::CacheClient;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.headers.cache().client().backend_name();
    (StatusCode::OK, Json(json!({"status": "ok", "cache": cache})))
}
