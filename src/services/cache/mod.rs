pub mod client;
pub mod memory;
pub mod valkey;

use async_trait::async_trait;

pub use client::{CacheClient, CacheError, CacheResult};
pub use memory::MemoryCache;
pub use valkey::ValkeyClient;

/// Backend chosen at startup from configuration.
#[derive(Clone, Debug)]
pub enum CacheBackend {
    Memory(MemoryCache),
    Valkey(ValkeyClient),
}

impl CacheBackend {
    /// Valkey when a URL is configured, otherwise process memory.
    pub async fn connect(valkey_url: Option<&str>) -> Result<Self, CacheError> {
        match valkey_url {
            Some(url) => Ok(Self::Valkey(ValkeyClient::new(url).await?)),
            None => Ok(Self::Memory(MemoryCache::new())),
        }
    }
}

#[async_trait]
impl CacheClient for CacheBackend {
    fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(c) => c.backend_name(),
            Self::Valkey(c) => c.backend_name(),
        }
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        match self {
            Self::Memory(c) => c.get_string(key).await,
            Self::Valkey(c) => c.get_string(key).await,
        }
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> CacheResult<bool> {
        match self {
            Self::Memory(c) => c.set_if_absent(key, value).await,
            Self::Valkey(c) => c.set_if_absent(key, value).await,
        }
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        match self {
            Self::Memory(c) => c.del(key).await,
            Self::Valkey(c) => c.del(key).await,
        }
    }

    async fn incr(&self, key: &str) -> CacheResult<u64> {
        match self {
            Self::Memory(c) => c.incr(key).await,
            Self::Valkey(c) => c.incr(key).await,
        }
    }
}
