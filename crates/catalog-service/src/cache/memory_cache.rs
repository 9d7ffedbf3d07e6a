//! In-process cache with the same expiry semantics as the Redis backend.

use super::CacheInterface;
use async_trait::async_trait;
use catalog_core::{CatalogError, CatalogResult, Clock, SystemClock};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Hash-map backed cache.
///
/// Expiry is evaluated lazily against the injected [`Clock`]; an entry is
/// live while `now < expires_at`. Expired entries are dropped on the next
/// write to the same key or by [`InMemoryCache::purge_expired`].
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    /// Creates an empty cache driven by wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache driven by the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .values()
            .filter(|entry| now < entry.expires_at)
            .count()
    }

    /// Returns `true` if there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the expiry instant of a live entry.
    #[must_use]
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.live(key).map(|entry| entry.expires_at)
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries.write().retain(|_, entry| now < entry.expires_at);
    }

    fn live(&self, key: &str) -> Option<Entry> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .cloned()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheInterface for InMemoryCache {
    async fn exists(&self, key: &str) -> CatalogResult<bool> {
        Ok(self.live(key).is_some())
    }

    async fn get_raw(&self, key: &str) -> CatalogResult<Option<String>> {
        Ok(self.live(key).map(|entry| entry.value))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> CatalogResult<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CatalogError::internal(format!("TTL out of range: {e}")))?;
        let entry = Entry {
            value: value.to_string(),
            expires_at: self.clock.now() + ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("entries", &self.entries.read().len())
            .finish_non_exhaustive()
    }
}
