//! Memoization of compiled headers.
//!
//! Values are kept until explicitly invalidated (no TTL). "No header" is a
//! result like any other and is cached as `null`, so an unconfigured header
//! costs one compilation per invalidation, not one per request.
//!
//! Every key has a generation counter (`<prefix>:<key>:gen`) and values live
//! under `<prefix>:<key>:<generation>`. The generation is read before
//! computing, and invalidation bumps it, so a populate that started before an
//! invalidation can only write into a generation nobody reads any more.
//!
//! The cache is an optimization only: when the backend fails, the value is
//! computed directly for that request and the failure is logged.

use serde::{Serialize, de::DeserializeOwned};

use crate::services::cache::{CacheClient, CacheError, CacheResult};

#[derive(Clone)]
pub struct HeaderCache<C: CacheClient> {
    client: C,
    // Namespace to avoid collisions across deployments sharing one Valkey.
    prefix: String,
}

impl<C: CacheClient> HeaderCache<C> {
    pub fn new(client: C, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, raw: &str) -> String {
        format!("{}:{}", self.prefix, raw)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn get_or_compute<T, F>(&self, key: &str, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let base = self.key(key);

        // Read before computing: the settings snapshot must be newer than the generation.
        let generation = match self.generation(&base).await {
            Ok(generation) => generation,
            Err(e) => {
                tracing::warn!(
                    key = %base,
                    backend = self.client.backend_name(),
                    error = %e,
                    "header cache unavailable, computing directly"
                );
                return compute();
            }
        };
        let full_key = format!("{base}:{generation}");

        match self.client.get_string(&full_key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => return value,
                Err(e) => {
                    // Written by an older build; replace it.
                    tracing::warn!(key = %full_key, error = %e, "discarding undecodable cache entry");
                    self.evict(&full_key).await;
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    key = %full_key,
                    backend = self.client.backend_name(),
                    error = %e,
                    "header cache unavailable, computing directly"
                );
                return compute();
            }
        }

        let value = compute();
        tracing::debug!(key = %full_key, "computed header");

        match serde_json::to_string(&value) {
            Ok(raw) => {
                // Losing a populate race is fine: both writers computed the same value.
                if let Err(e) = self.client.set_if_absent(&full_key, &raw).await {
                    tracing::warn!(key = %full_key, error = %e, "failed to store header");
                }
            }
            Err(e) => tracing::warn!(key = %full_key, error = %e, "failed to encode header"),
        }

        value
    }

    /// Start a new generation so the next request recomputes, then drop the
    /// previous generation's value.
    pub async fn invalidate(&self, key: &str) {
        let base = self.key(key);

        match self.client.incr(&format!("{base}:gen")).await {
            Ok(generation) => {
                let previous = generation.saturating_sub(1);
                self.evict(&format!("{base}:{previous}")).await;
            }
            Err(e) => tracing::warn!(key = %base, error = %e, "failed to invalidate header"),
        }
    }

    async fn generation(&self, base: &str) -> CacheResult<u64> {
        let gen_key = format!("{base}:gen");
        match self.client.get_string(&gen_key).await? {
            None => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| CacheError::BackendCommand(format!("{gen_key} is not an integer"))),
        }
    }

    async fn evict(&self, full_key: &str) {
        match self.client.del(full_key).await {
            Ok(_) => tracing::debug!(key = %full_key, "dropped header"),
            Err(e) => tracing::warn!(key = %full_key, error = %e, "failed to drop header"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::services::cache::MemoryCache;

    /// A backend that is always down.
    #[derive(Clone)]
    struct BrokenCache;

    #[async_trait]
    impl CacheClient for BrokenCache {
        fn backend_name(&self) -> &'static str {
            "broken"
        }

        async fn get_string(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::BackendConnection("refused".into()))
        }

        async fn set_if_absent(&self, _key: &str, _value: &str) -> CacheResult<bool> {
            Err(CacheError::BackendConnection("refused".into()))
        }

        async fn del(&self, _key: &str) -> CacheResult<u64> {
            Err(CacheError::BackendConnection("refused".into()))
        }

        async fn incr(&self, _key: &str) -> CacheResult<u64> {
            Err(CacheError::BackendConnection("refused".into()))
        }
    }

    /// Memory backend whose first write parks until released.
    #[derive(Clone, Default)]
    struct GatedCache {
        inner: MemoryCache,
        armed: Arc<AtomicBool>,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl GatedCache {
        fn armed() -> Self {
            let gated = Self::default();
            gated.armed.store(true, Ordering::SeqCst);
            gated
        }
    }

    #[async_trait]
    impl CacheClient for GatedCache {
        fn backend_name(&self) -> &'static str {
            "gated"
        }

        async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
            self.inner.get_string(key).await
        }

        async fn set_if_absent(&self, key: &str, value: &str) -> CacheResult<bool> {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.set_if_absent(key, value).await
        }

        async fn del(&self, key: &str) -> CacheResult<u64> {
            self.inner.del(key).await
        }

        async fn incr(&self, key: &str) -> CacheResult<u64> {
            self.inner.incr(key).await
        }
    }

    #[tokio::test]
    async fn computes_once_until_invalidated() {
        let cache = HeaderCache::new(MemoryCache::new(), "test");
        let calls = AtomicUsize::new(0);
        let compute = |v: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(v.to_string())
        };

        assert_eq!(cache.get_or_compute("k", || compute("a")).await, Some("a".to_string()));
        // Stale until invalidated, even if the underlying input changed.
        assert_eq!(cache.get_or_compute("k", || compute("b")).await, Some("a".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate("k").await;
        assert_eq!(cache.get_or_compute("k", || compute("b")).await, Some("b".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn absent_results_are_cached_too() {
        let cache = HeaderCache::new(MemoryCache::new(), "test");
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Option<String> = cache
                .get_or_compute("none", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    None
                })
                .await;
            assert_eq!(value, None);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn undecodable_entries_are_recomputed() {
        let backend = MemoryCache::new();
        backend.set_if_absent("test:k:0", "{not json").await.unwrap();
        let cache = HeaderCache::new(backend.clone(), "test");

        let value: Option<String> = cache.get_or_compute("k", || Some("fresh".into())).await;
        assert_eq!(value.as_deref(), Some("fresh"));
        assert_eq!(
            backend.get_string("test:k:0").await.unwrap().as_deref(),
            Some("\"fresh\"")
        );
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_direct_computation() {
        let cache = HeaderCache::new(BrokenCache, "test");
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Option<String> = cache
                .get_or_compute("k", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some("direct".into())
                })
                .await;
            assert_eq!(value.as_deref(), Some("direct"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Does not panic or error.
        cache.invalidate("k").await;
    }

    #[tokio::test]
    async fn populate_racing_an_invalidation_cannot_restore_the_old_value() {
        let gated = GatedCache::armed();
        let cache = HeaderCache::new(gated.clone(), "test");

        // Computed from the old settings, then parked before its write lands.
        let populate = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_compute("k", || Some("DENY".to_string())).await })
        };
        gated.entered.notified().await;

        // Settings saved meanwhile.
        cache.invalidate("k").await;
        gated.release.notify_one();
        assert_eq!(populate.await.unwrap().as_deref(), Some("DENY"));

        let value = cache.get_or_compute("k", || Some("SAMEORIGIN".to_string())).await;
        assert_eq!(value.as_deref(), Some("SAMEORIGIN"));
    }

    #[tokio::test]
    async fn invalidation_drops_the_previous_generation() {
        let backend = MemoryCache::new();
        let cache = HeaderCache::new(backend.clone(), "test");

        let _: Option<String> = cache.get_or_compute("k", || Some("a".into())).await;
        assert!(backend.get_string("test:k:0").await.unwrap().is_some());

        cache.invalidate("k").await;
        assert_eq!(backend.get_string("test:k:0").await.unwrap(), None);
        assert_eq!(backend.get_string("test:k:gen").await.unwrap().as_deref(), Some("1"));
    }
}
