//! Read-through product lookup.

use crate::cache::{cache_keys, CacheExt, CacheInterface, PRODUCT_TTL};
use crate::product_lookup::{LookupTimeouts, ProductLookup};
use catalog_core::{CatalogError, CatalogResult, Product, ProductId};
use catalog_repository::ProductRepository;
use async_trait::async_trait;
use shaku::Component;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Lookup that serves products from the cache and falls back to the store.
///
/// A cache outage degrades to a store read; an undecodable cached value is
/// surfaced as [`CatalogError::CacheCorruption`]. Entries are only written
/// after a successful store read and are never refreshed on a hit, so a
/// product edited in the store may be served stale for up to [`PRODUCT_TTL`].
#[derive(Component)]
#[shaku(interface = ProductLookup)]
pub struct ReadThroughProductLookup {
    #[shaku(inject)]
    repository: Arc<dyn ProductRepository>,
    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,
    timeouts: LookupTimeouts,
}

impl ReadThroughProductLookup {
    /// Creates a lookup with default deadlines.
    #[must_use]
    pub fn new(repository: Arc<dyn ProductRepository>, cache: Arc<dyn CacheInterface>) -> Self {
        Self::with_timeouts(repository, cache, LookupTimeouts::default())
    }

    /// Creates a lookup with explicit per-call deadlines.
    #[must_use]
    pub fn with_timeouts(
        repository: Arc<dyn ProductRepository>,
        cache: Arc<dyn CacheInterface>,
        timeouts: LookupTimeouts,
    ) -> Self {
        Self {
            repository,
            cache,
            timeouts,
        }
    }

    /// Returns the cached product, `None` on a miss.
    async fn read_cache(&self, key: &str) -> CatalogResult<Option<Product>> {
        if !within(self.timeouts.cache, self.cache.exists(key), cache_timeout).await? {
            return Ok(None);
        }
        within(self.timeouts.cache, self.cache.get::<Product>(key), cache_timeout).await
    }

    async fn read_store(&self, id: ProductId) -> CatalogResult<Product> {
        within(self.timeouts.store, self.repository.find_by_id(id), store_timeout)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product", id))
    }

    /// Best-effort write; failures are logged and dropped.
    async fn populate(&self, key: &str, product: &Product) {
        if !self.cache.is_enabled() {
            return;
        }

        let write = self.cache.set(key, product, PRODUCT_TTL);
        match within(self.timeouts.cache, write, cache_timeout).await {
            Ok(()) => debug!("Cached product {} under '{}'", product.id, key),
            Err(e) => warn!(
                key = %key,
                error = %e,
                "Failed to populate product cache"
            ),
        }
    }
}

#[async_trait]
impl ProductLookup for ReadThroughProductLookup {
    async fn get_by_id(&self, id: ProductId) -> CatalogResult<Product> {
        let key = cache_keys::product_by_id(id);

        match self.read_cache(&key).await {
            Ok(Some(product)) => {
                debug!("Serving product {} from cache", id);
                return Ok(product);
            }
            Ok(None) => debug!("Cache miss for product {}", id),
            Err(e @ CatalogError::CacheCorruption(_)) => return Err(e),
            Err(e) => warn!(
                key = %key,
                error = %e,
                "Cache read failed, falling back to store"
            ),
        }

        let product = self.read_store(id).await?;
        self.populate(&key, &product).await;

        Ok(product)
    }
}

impl std::fmt::Debug for ReadThroughProductLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThroughProductLookup")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

/// Runs `fut` under `limit`, mapping an elapsed deadline through `on_timeout`.
async fn within<T, F>(
    limit: Duration,
    fut: F,
    on_timeout: fn(Duration) -> CatalogError,
) -> CatalogResult<T>
where
    F: Future<Output = CatalogResult<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(on_timeout(limit)))
}

fn cache_timeout(limit: Duration) -> CatalogError {
    CatalogError::CacheUnavailable(format!("Cache command exceeded {}ms", limit.as_millis()))
}

fn store_timeout(limit: Duration) -> CatalogError {
    CatalogError::StoreUnavailable(format!("Store query exceeded {}ms", limit.as_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use catalog_core::{Clock, ManualClock, NewProduct};
    use mockall::mock;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory repository that counts reads.
    struct MockProductRepository {
        products: Mutex<HashMap<ProductId, Product>>,
        reads: AtomicUsize,
        delay: Option<Duration>,
        fail: bool,
    }

    impl MockProductRepository {
        fn new() -> Self {
            Self {
                products: Mutex::new(HashMap::new()),
                reads: AtomicUsize::new(0),
                delay: None,
                fail: false,
            }
        }

        fn with_product(product: Product) -> Self {
            let repo = Self::new();
            repo.products.lock().insert(product.id, product);
            repo
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn slow(delay: Duration, product: Product) -> Self {
            Self {
                delay: Some(delay),
                ..Self::with_product(product)
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProductRepository for MockProductRepository {
        async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(CatalogError::StoreUnavailable("connection refused".into()));
            }
            Ok(self.products.lock().get(&id).cloned())
        }

        async fn find_all(&self) -> CatalogResult<Vec<Product>> {
            Ok(self.products.lock().values().cloned().collect())
        }

        async fn create(&self, product: &NewProduct) -> CatalogResult<Product> {
            let mut products = self.products.lock();
            let id = ProductId::from_raw(i64::try_from(products.len()).unwrap() + 1);
            let created = product.clone().into_product(id);
            products.insert(id, created.clone());
            Ok(created)
        }

        async fn update(&self, product: &Product) -> CatalogResult<Product> {
            self.products.lock().insert(product.id, product.clone());
            Ok(product.clone())
        }

        async fn delete(&self, id: ProductId) -> CatalogResult<()> {
            self.products.lock().remove(&id);
            Ok(())
        }
    }

    mock! {
        pub Cache {}

        #[async_trait]
        impl CacheInterface for Cache {
            async fn exists(&self, key: &str) -> CatalogResult<bool>;
            async fn get_raw(&self, key: &str) -> CatalogResult<Option<String>>;
            async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> CatalogResult<()>;
            fn is_enabled(&self) -> bool;
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Stall {
        Exists,
        Read,
        Write,
    }

    /// Cache that hangs on one command; the others answer immediately.
    struct StallingCache {
        stall: Stall,
        completed_writes: AtomicUsize,
    }

    impl StallingCache {
        fn new(stall: Stall) -> Self {
            Self {
                stall,
                completed_writes: AtomicUsize::new(0),
            }
        }

        async fn hang_if(&self, op: Stall) {
            if self.stall == op {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }

    #[async_trait]
    impl CacheInterface for StallingCache {
        async fn exists(&self, _key: &str) -> CatalogResult<bool> {
            self.hang_if(Stall::Exists).await;
            Ok(self.stall == Stall::Read)
        }

        async fn get_raw(&self, _key: &str) -> CatalogResult<Option<String>> {
            self.hang_if(Stall::Read).await;
            Ok(None)
        }

        async fn set_raw(&self, _key: &str, _value: &str, _ttl: Duration) -> CatalogResult<()> {
            self.hang_if(Stall::Write).await;
            self.completed_writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            true
        }
    }

    fn widget() -> Product {
        Product::new(ProductId::from_raw(1), "Widget", "A widget", 9.99)
    }

    fn widget_json() -> String {
        serde_json::to_string(&widget()).unwrap()
    }

    fn lookup_with(
        repo: Arc<MockProductRepository>,
        cache: Arc<dyn CacheInterface>,
    ) -> ReadThroughProductLookup {
        ReadThroughProductLookup::new(repo, cache)
    }

    #[tokio::test]
    async fn test_miss_reads_store_and_populates_cache() {
        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(InMemoryCache::with_clock(clock.clone()));
        let lookup = lookup_with(repo.clone(), cache.clone());

        let product = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();

        assert_eq!(product, widget());
        assert_eq!(repo.reads(), 1);
        assert_eq!(
            cache.get_raw("cache_products:1").await.unwrap(),
            Some(widget_json())
        );
        assert_eq!(
            cache.expires_at("cache_products:1"),
            Some(clock.now() + chrono::Duration::seconds(300))
        );
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_store() {
        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(InMemoryCache::with_clock(clock.clone()));
        let lookup = lookup_with(repo.clone(), cache);

        lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();
        clock.advance(chrono::Duration::seconds(299));
        let second = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();

        assert_eq!(second, widget());
        assert_eq!(repo.reads(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_requeries_store() {
        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(InMemoryCache::with_clock(clock.clone()));
        let lookup = lookup_with(repo.clone(), cache);

        lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();
        clock.advance(chrono::Duration::seconds(300));
        lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();

        assert_eq!(repo.reads(), 2);
    }

    #[tokio::test]
    async fn test_stale_value_served_until_expiry() {
        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(InMemoryCache::with_clock(clock.clone()));
        let lookup = lookup_with(repo.clone(), cache);

        lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();

        let mut renamed = widget();
        renamed.name = "Gadget".to_string();
        repo.update(&renamed).await.unwrap();

        let cached = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();
        assert_eq!(cached.name, "Widget");

        clock.advance(chrono::Duration::seconds(300));
        let fresh = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();
        assert_eq!(fresh.name, "Gadget");
    }

    #[tokio::test]
    async fn test_not_found_does_not_write_cache() {
        let repo = Arc::new(MockProductRepository::new());
        let cache = Arc::new(InMemoryCache::new());
        let lookup = lookup_with(repo.clone(), cache.clone());

        let err = lookup.get_by_id(ProductId::from_raw(42)).await.unwrap_err();

        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert!(cache.is_empty());

        // absence is not cached either
        lookup.get_by_id(ProductId::from_raw(42)).await.unwrap_err();
        assert_eq!(repo.reads(), 2);
    }

    #[tokio::test]
    async fn test_cache_outage_degrades_to_store() {
        let mut cache = MockCache::new();
        cache
            .expect_exists()
            .returning(|_| Err(CatalogError::CacheUnavailable("connection refused".into())));
        cache.expect_is_enabled().return_const(true);
        cache
            .expect_set_raw()
            .times(1)
            .returning(|_, _, _| Err(CatalogError::CacheUnavailable("connection refused".into())));

        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let lookup = lookup_with(repo.clone(), Arc::new(cache));

        let product = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();

        assert_eq!(product, widget());
        assert_eq!(repo.reads(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_error() {
        let mut cache = MockCache::new();
        cache.expect_exists().returning(|_| Ok(true));
        cache
            .expect_get_raw()
            .returning(|_| Ok(Some("{\"ID\":".to_string())));
        cache.expect_set_raw().never();

        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let lookup = lookup_with(repo.clone(), Arc::new(cache));

        let err = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap_err();

        assert!(matches!(err, CatalogError::CacheCorruption(_)));
        assert_eq!(repo.reads(), 0);
    }

    #[tokio::test]
    async fn test_hit_performs_no_write() {
        let mut cache = MockCache::new();
        cache.expect_exists().returning(|_| Ok(true));
        cache.expect_get_raw().returning(|_| Ok(Some(widget_json())));
        cache.expect_set_raw().never();

        let repo = Arc::new(MockProductRepository::new());
        let lookup = lookup_with(repo.clone(), Arc::new(cache));

        let product = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();

        assert_eq!(product, widget());
        assert_eq!(repo.reads(), 0);
    }

    #[tokio::test]
    async fn test_key_vanishing_between_check_and_read_is_miss() {
        let mut cache = MockCache::new();
        cache.expect_exists().returning(|_| Ok(true));
        cache.expect_get_raw().returning(|_| Ok(None));
        cache.expect_is_enabled().return_const(true);
        cache.expect_set_raw().times(1).returning(|_, _, _| Ok(()));

        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let lookup = lookup_with(repo.clone(), Arc::new(cache));

        assert_eq!(lookup.get_by_id(ProductId::from_raw(1)).await.unwrap(), widget());
        assert_eq!(repo.reads(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated_without_write() {
        let mut cache = MockCache::new();
        cache.expect_exists().returning(|_| Ok(false));
        cache.expect_set_raw().never();

        let repo = Arc::new(MockProductRepository::failing());
        let lookup = lookup_with(repo, Arc::new(cache));

        let err = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap_err();
        assert!(matches!(err, CatalogError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_disabled_cache_always_reads_store() {
        let mut cache = MockCache::new();
        cache.expect_exists().returning(|_| Ok(false));
        cache.expect_is_enabled().return_const(false);
        cache.expect_set_raw().never();

        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let lookup = lookup_with(repo.clone(), Arc::new(cache));

        lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();
        lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();
        assert_eq!(repo.reads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let repo = Arc::new(MockProductRepository::slow(Duration::from_secs(10), widget()));
        let cache = Arc::new(InMemoryCache::new());
        let lookup = ReadThroughProductLookup::with_timeouts(
            repo,
            cache.clone(),
            LookupTimeouts {
                cache: Duration::from_millis(250),
                store: Duration::from_secs(2),
            },
        );

        let err = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap_err();

        assert!(matches!(err, CatalogError::StoreUnavailable(_)));
        assert!(cache.is_empty());
    }

    async fn lookup_with_stalled_cache(stall: Stall) -> (CatalogResult<Product>, usize, usize) {
        let repo = Arc::new(MockProductRepository::with_product(widget()));
        let cache = Arc::new(StallingCache::new(stall));
        let lookup = ReadThroughProductLookup::with_timeouts(
            repo.clone(),
            cache.clone(),
            LookupTimeouts {
                cache: Duration::from_millis(250),
                store: Duration::from_secs(2),
            },
        );

        let result = lookup.get_by_id(ProductId::from_raw(1)).await;
        (result, repo.reads(), cache.completed_writes.load(Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_presence_check_degrades_to_store() {
        let (result, reads, writes) = lookup_with_stalled_cache(Stall::Exists).await;

        assert_eq!(result.unwrap(), widget());
        assert_eq!(reads, 1);
        assert_eq!(writes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_read_after_presence_degrades_to_store() {
        let (result, reads, writes) = lookup_with_stalled_cache(Stall::Read).await;

        assert_eq!(result.unwrap(), widget());
        assert_eq!(reads, 1);
        assert_eq!(writes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_population_is_abandoned() {
        let (result, reads, writes) = lookup_with_stalled_cache(Stall::Write).await;

        assert_eq!(result.unwrap(), widget());
        assert_eq!(reads, 1);
        assert_eq!(writes, 0);
    }

    #[tokio::test]
    async fn test_lookups_are_isolated_per_id() {
        let repo = Arc::new(MockProductRepository::new());
        repo.create(&NewProduct::new("Widget", "A widget", 9.99)).await.unwrap();
        repo.create(&NewProduct::new("Gadget", "A gadget", 19.5)).await.unwrap();
        let cache = Arc::new(InMemoryCache::new());
        let lookup = lookup_with(repo, cache.clone());

        let first = lookup.get_by_id(ProductId::from_raw(1)).await.unwrap();
        let second = lookup.get_by_id(ProductId::from_raw(2)).await.unwrap();

        assert_eq!(first.name, "Widget");
        assert_eq!(second.name, "Gadget");
        assert_eq!(cache.len(), 2);
    }
}
