//! Repository trait definitions.

use catalog_core::{CatalogResult, Interface, NewProduct, Product, ProductId};
use async_trait::async_trait;

/// Product repository trait.
#[async_trait]
pub trait ProductRepository: Interface + Send + Sync {
    /// Finds a product by ID.
    async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>>;

    /// Lists every product ordered by ID.
    async fn find_all(&self) -> CatalogResult<Vec<Product>>;

    /// Inserts a product and returns it with its assigned ID.
    async fn create(&self, product: &NewProduct) -> CatalogResult<Product>;

    /// Replaces the fields of an existing product.
    ///
    /// Fails with `NotFound` if no row has the product's ID.
    async fn update(&self, product: &Product) -> CatalogResult<Product>;

    /// Deletes a product by ID.
    ///
    /// Fails with `NotFound` if no row has the ID.
    async fn delete(&self, id: ProductId) -> CatalogResult<()>;
}
