//! Product lookup trait definition.

use async_trait::async_trait;
use catalog_config::AppConfig;
use catalog_core::{CatalogResult, Interface, Product, ProductId};
use std::time::Duration;

/// Product lookup trait.
#[async_trait]
pub trait ProductLookup: Interface + Send + Sync {
    /// Gets a product by ID, serving from cache when possible.
    async fn get_by_id(&self, id: ProductId) -> CatalogResult<Product>;
}

/// Deadlines applied to each individual backend call during a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTimeouts {
    /// Deadline for each cache command.
    pub cache: Duration,
    /// Deadline for each store query.
    pub store: Duration,
}

impl Default for LookupTimeouts {
    fn default() -> Self {
        Self {
            cache: Duration::from_millis(250),
            store: Duration::from_secs(2),
        }
    }
}

impl LookupTimeouts {
    /// Reads the deadlines from application configuration.
    #[must_use]
    pub const fn from_config(config: &AppConfig) -> Self {
        Self {
            cache: config.cache.operation_timeout(),
            store: config.database.query_timeout(),
        }
    }
}
