//! Cache key generators for consistent key naming.

use catalog_core::ProductId;

/// Namespace prefix for product entries.
const PRODUCT_PREFIX: &str = "cache_products";

/// Hash field holding the serialized entity.
pub const DATA_FIELD: &str = "data";

/// Generate a cache key for a product by ID.
#[must_use]
pub fn product_by_id(id: ProductId) -> String {
    format!("{PRODUCT_PREFIX}:{id}")
}
