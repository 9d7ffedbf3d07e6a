//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use catalog_core::{CatalogError, CatalogResult, Interface};
use std::time::Duration;

/// Cache interface for storing and retrieving serialized entities.
///
/// Backends store one serialized value per key. A key whose TTL has elapsed
/// must be reported as absent, whether or not the backend has evicted it yet.
///
/// Uses JSON strings for type-erased storage to maintain dyn-compatibility.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Check if a live entry exists for the key.
    async fn exists(&self, key: &str) -> CatalogResult<bool>;

    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> CatalogResult<Option<String>>;

    /// Set a raw JSON value in the cache with a TTL.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> CatalogResult<()>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Extension trait with typed methods for convenience.
///
/// Decoding failures surface as [`CatalogError::CacheCorruption`] and encoding
/// failures as [`CatalogError::Serialization`], so callers can tell a bad
/// entry apart from an unreachable backend.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get a typed value from the cache.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> CatalogResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
                CatalogError::CacheCorruption(format!("Undecodable value at '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }

    /// Set a typed value in the cache.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CatalogResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

// Blanket implementation for all CacheInterface implementations
impl<T: CacheInterface + ?Sized> CacheExt for T {}
