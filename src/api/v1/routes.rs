/*
 * Responsibility
 * - v1 URL structure
 * - /settings and /headers are admin-only (bearer token via route layer)
 */
use axum::{
    Router,
    routing::{delete, get},
};

use crate::api::v1::handlers::{
    headers::{clear_cache, preview},
    settings::{get_group, save_group},
};
use crate::middleware::admin_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/settings/{group}", get(get_group).put(save_group))
        .route("/headers", get(preview))
        .route("/headers/cache", delete(clear_cache));

    admin_auth::apply(admin, state)
}
