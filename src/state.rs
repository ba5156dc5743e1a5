/*
 * Responsibility
 * - Shared context for the Router (AppState)
 * - Clone is cheap (everything behind Arc)
 */
use std::sync::Arc;

use crate::headers::HeaderAssembler;
use crate::services::cache::CacheBackend;
use crate::settings::MemorySettings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<MemorySettings>,
    pub headers: Arc<HeaderAssembler<CacheBackend>>,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        settings: Arc<MemorySettings>,
        headers: Arc<HeaderAssembler<CacheBackend>>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            settings,
            headers,
            admin_token: admin_token.map(Arc::from),
        }
    }
}
