use async_trait::async_trait;
use std::time::Duration;

/// Key/value cache with per-entry expiry. Backs the session store.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from the cache.
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value in the cache with optional TTL.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Push an existing key's expiry out to `ttl` from now.
    ///
    /// Never creates the key. Returns `false` when the key is absent.
    async fn touch(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
