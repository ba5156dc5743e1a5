//! Bearer token check for the settings API.
//!
//! When no `ADMIN_TOKEN` is configured (development), requests pass through.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8: `from_fn` cannot extract State, so pass it via `from_fn_with_state`.
    router.layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

async fn admin_auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if !token_matches(token, expected) {
        tracing::warn!(path = %req.uri().path(), "rejected settings API call");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

// Constant-time over fixed-size digests.
fn token_matches(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
