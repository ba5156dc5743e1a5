//! Cache client interface used by the header cache.
use async_trait::async_trait;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Note:
/// - Kept separate from `AppError`: the header cache fails open and falls back
///   to computing without the cache, so these never reach a client.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A minimal, string-based cache interface.
///
/// Entries never expire; they live until `del` is called. That matches
/// "compute once, reuse until settings change".
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Set value if the key does not exist.
    //
    // Returns:
    // - `Ok(true)`  if the key was set
    // - `Ok(false)` if another writer got there first
    async fn set_if_absent(&self, key: &str, value: &str) -> CacheResult<bool>;

    // Delete a key. Returns number of deleted keys.
    async fn del(&self, key: &str) -> CacheResult<u64>;

    // Atomically increment an integer key (missing counts as 0).
    // Returns the new value.
    async fn incr(&self, key: &str) -> CacheResult<u64>;
}
