//! Security response headers for every route.
//!
//! This middleware is applied at the Router level, outermost, so it sees
//! every response including errors from inner layers.
//!
//! Per request:
//! - generate a CSP nonce and hand it to handlers via request extensions
//! - run the handler
//! - attach every configured security header (cached), rendering the nonce
//!   into the CSP

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::state::AppState;

/// Per-request nonce. Handlers read it with `Extension<CspNonce>` to tag
/// inline `<script nonce="...">` elements.
#[derive(Clone, Debug)]
pub struct CspNonce(String);

impl CspNonce {
    /// 128 random bits, base64 encoded.
    pub fn generate() -> Self {
        Self(STANDARD.encode(Uuid::new_v4().as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn apply(router: Router, state: AppState) -> Router {
    router.layer(middleware::from_fn_with_state(
        state,
        security_headers_middleware,
    ))
}

async fn security_headers_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let nonce = CspNonce::generate();
    req.extensions_mut().insert(nonce.clone());

    let mut response = next.run(req).await;
    state
        .headers
        .attach_all(response.headers_mut(), nonce.as_str())
        .await;

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_are_unique_and_header_safe() {
        let a = CspNonce::generate();
        let b = CspNonce::generate();

        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(a.as_str().len(), 24);
        assert!(
            a.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        );
    }
}
