//! Redis-based cache implementation.

use super::{cache_keys::DATA_FIELD, CacheInterface};
use async_trait::async_trait;
use catalog_config::RedisConfig;
use catalog_core::{CatalogError, CatalogResult};
use deadpool_redis::{
    redis::{self, AsyncCommands},
    Pool, PoolConfig, Runtime,
};
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Redis-based cache service.
///
/// Each key is a hash with a single `data` field; the expiry is set on the
/// hash itself in the same atomic pipeline as the write.
#[derive(Component)]
#[shaku(interface = CacheInterface)]
pub struct RedisCacheService {
    /// Redis connection pool; `None` when caching is disabled.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op cache service (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Round-trips a `PING` to verify the server is reachable.
    pub async fn ping(&self) -> CatalogResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CatalogError::CacheUnavailable(format!("PING failed: {e}")))?;
        Ok(())
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> CatalogResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                CatalogError::CacheUnavailable(format!("Failed to get Redis connection: {e}"))
            }),
            None => Err(CatalogError::CacheUnavailable("Cache is disabled".to_string())),
        }
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn exists(&self, key: &str) -> CatalogResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let exists: bool = conn.hexists(key, DATA_FIELD).await.map_err(|e| {
            CatalogError::CacheUnavailable(format!("Failed to check key '{key}': {e}"))
        })?;

        Ok(exists)
    }

    async fn get_raw(&self, key: &str) -> CatalogResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.hget(key, DATA_FIELD).await.map_err(|e| {
            CatalogError::CacheUnavailable(format!("Failed to get key '{key}': {e}"))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> CatalogResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let ttl_secs = i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX);

        let _: () = redis::pipe()
            .atomic()
            .hset(key, DATA_FIELD, value)
            .ignore()
            .expire(key, ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| CatalogError::CacheUnavailable(format!("Failed to set key '{key}': {e}")))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Creates the Redis connection pool, or `None` when Redis is disabled.
pub fn create_redis_pool(config: &RedisConfig) -> CatalogResult<Option<Arc<Pool>>> {
    if !config.enabled {
        info!("Redis disabled; product lookups will always read the store");
        return Ok(None);
    }

    let mut redis_cfg = deadpool_redis::Config::from_url(&config.url);
    redis_cfg.pool = Some(PoolConfig::new(config.pool_size));

    let pool = redis_cfg
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| CatalogError::CacheUnavailable(format!("Failed to create Redis pool: {e}")))?;

    info!("Redis connection pool created");
    Ok(Some(Arc::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache() {
        let cache = RedisCacheService::disabled();
        assert!(!cache.is_enabled());
        assert!(!cache.exists("cache_products:1").await.unwrap());
        assert!(cache.get_raw("cache_products:1").await.unwrap().is_none());
        cache
            .set_raw("cache_products:1", "{}", Duration::from_secs(300))
            .await
            .unwrap();
        cache.ping().await.unwrap();
    }

    #[test]
    fn test_create_pool_when_disabled() {
        let config = RedisConfig {
            enabled: false,
            ..RedisConfig::default()
        };
        assert!(create_redis_pool(&config).unwrap().is_none());
    }

    #[test]
    fn test_create_pool_rejects_bad_url() {
        let config = RedisConfig {
            url: "not a url".to_string(),
            ..RedisConfig::default()
        };
        let err = create_redis_pool(&config).unwrap_err();
        assert!(matches!(err, CatalogError::CacheUnavailable(_)));
    }
}
