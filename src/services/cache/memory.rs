use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Process-local cache. Used when no Valkey URL is configured and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> CacheResult<bool> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                Ok(true)
            }
        }
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        Ok(u64::from(self.entries.remove(key).is_some()))
    }

    async fn incr(&self, key: &str) -> CacheResult<u64> {
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| "0".into());
        let next = entry
            .parse::<u64>()
            .map_err(|_| CacheError::BackendCommand(format!("{key} is not an integer")))?
            + 1;
        *entry = next.to_string();
        Ok(next)
    }
}
