//! Caching infrastructure for the service layer.
//!
//! Entries are stored as a single `data` field inside a Redis hash, one hash
//! per product, with a fixed expiry applied at write time.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::InMemoryCache;
pub use redis_cache::{create_redis_pool, RedisCacheService, RedisCacheServiceParameters};

use std::time::Duration;

/// Lifetime of a cached product (5 minutes).
pub const PRODUCT_TTL: Duration = Duration::from_secs(300);
