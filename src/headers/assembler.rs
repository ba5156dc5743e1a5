//! Attaches compiled security headers to outgoing responses.
//!
//! Every family goes through the [`HeaderCache`]; only the CSP template is
//! rendered per response (nonce substitution), everything else is reused
//! verbatim.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use super::{
    cache::HeaderCache, family::HeaderFamily, report::ReportEndpoints, value::SecurityHeader,
};
use crate::services::cache::CacheClient;
use crate::settings::{Settings, SettingsStore};

pub struct HeaderAssembler<C: CacheClient> {
    settings: Arc<dyn SettingsStore>,
    endpoints: ReportEndpoints,
    cache: HeaderCache<C>,
    families: Vec<HeaderFamily>,
}

impl<C: CacheClient> HeaderAssembler<C> {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        endpoints: ReportEndpoints,
        cache: HeaderCache<C>,
    ) -> Self {
        Self {
            settings,
            endpoints,
            cache,
            families: HeaderFamily::ALL.to_vec(),
        }
    }

    pub fn cache(&self) -> &HeaderCache<C> {
        &self.cache
    }

    /// Compile without the cache.
    pub fn compile(&self, family: HeaderFamily) -> Option<SecurityHeader> {
        family.compile(&Settings::new(self.settings.as_ref()), &self.endpoints)
    }

    pub async fn header(&self, family: HeaderFamily) -> Option<SecurityHeader> {
        self.cache
            .get_or_compute(family.cache_key(), || self.compile(family))
            .await
    }

    /// Set one family's header on `headers`. Returns whether a header was set.
    pub async fn attach(&self, family: HeaderFamily, headers: &mut HeaderMap, nonce: &str) -> bool {
        let Some(header) = self.header(family).await else {
            return false;
        };

        let name = match HeaderName::from_bytes(header.name().as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(header = header.name(), error = %e, "invalid header name");
                return false;
            }
        };
        let value = match HeaderValue::from_str(&header.render(nonce)) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(header = header.name(), error = %e, "invalid header value");
                return false;
            }
        };

        headers.insert(name, value);
        true
    }

    pub async fn attach_all(&self, headers: &mut HeaderMap, nonce: &str) {
        for &family in &self.families {
            self.attach(family, headers, nonce).await;
        }
    }

    /// Every header currently configured, unrendered.
    pub async fn headers(&self) -> Vec<SecurityHeader> {
        let mut out = Vec::with_capacity(self.families.len());
        for &family in &self.families {
            if let Some(header) = self.header(family).await {
                out.push(header);
            }
        }
        out
    }

    pub async fn invalidate(&self, family: HeaderFamily) {
        self.cache.invalidate(family.cache_key()).await;
    }

    /// Invalidate every family that reads `group`, after that group is saved.
    pub async fn invalidate_group(&self, group: &str) -> Vec<HeaderFamily> {
        let stale: Vec<HeaderFamily> = self
            .families
            .iter()
            .copied()
            .filter(|f| f.reads(group))
            .collect();

        for &family in &stale {
            self.invalidate(family).await;
        }
        tracing::info!(group, invalidated = stale.len(), "settings group saved");
        stale
    }

    pub async fn invalidate_all(&self) {
        for &family in &self.families {
            self.invalidate(family).await;
        }
    }
}
