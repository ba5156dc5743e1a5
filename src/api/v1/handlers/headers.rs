use axum::{Json, extract::State, http::StatusCode};

use crate::{api::v1::dto::headers::HeaderPreview, state::AppState};

/// GET /headers: what would be attached right now (templates, not rendered).
pub async fn preview(State(state): State<AppState>) -> Json<Vec<HeaderPreview>> {
    let headers = state.headers.headers().await;
    Json(headers.into_iter().map(HeaderPreview::from).collect())
}

/// DELETE /headers/cache
pub async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.headers.invalidate_all().await;
    StatusCode::NO_CONTENT
}
