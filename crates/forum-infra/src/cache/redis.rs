//! Redis cache - shares sessions across server instances.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use forum_core::ports::{Cache, CacheError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    pub connect_timeout: Duration,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Redis-backed cache using a reconnecting connection manager.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!("Connected to Redis cache");
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Redis GET failed"))
            .ok()
            .flatten()
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let result = match ttl {
            // SETEX rejects 0; round sub-second TTLs up.
            Some(duration) => {
                conn.set_ex::<_, _, ()>(key, value, duration.as_secs().max(1))
                    .await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };
        result.map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn touch(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        // EXPIRE is a no-op on a missing key.
        conn.expire::<_, bool>(key, ttl.as_secs().max(1) as i64)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_cache() -> Option<RedisCache> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6389".to_string());
        let config = RedisConfig {
            url,
            connect_timeout: Duration::from_secs(1),
        };
        RedisCache::connect(&config).await.ok()
    }

    #[tokio::test]
    async fn test_redis_cache_set_get_delete() {
        let Some(cache) = test_cache().await else {
            return;
        };

        cache.set("forum_test_key", "value", None).await.unwrap();
        assert_eq!(cache.get("forum_test_key").await, Some("value".to_string()));

        cache.delete("forum_test_key").await.unwrap();
        assert_eq!(cache.get("forum_test_key").await, None);
    }

    #[tokio::test]
    async fn test_redis_touch_does_not_create() {
        let Some(cache) = test_cache().await else {
            return;
        };

        cache.delete("forum_test_touch").await.unwrap();
        assert!(!cache.touch("forum_test_touch", Duration::from_secs(30)).await.unwrap());
        assert_eq!(cache.get("forum_test_touch").await, None);

        cache.set("forum_test_touch", "v", Some(Duration::from_secs(5))).await.unwrap();
        assert!(cache.touch("forum_test_touch", Duration::from_secs(30)).await.unwrap());
        cache.delete("forum_test_touch").await.unwrap();
    }
}
