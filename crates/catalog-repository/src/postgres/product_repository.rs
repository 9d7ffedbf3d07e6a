//! PostgreSQL product repository implementation.

use crate::{traits::ProductRepository, DatabasePoolInterface};
use async_trait::async_trait;
use catalog_core::{CatalogError, CatalogResult, NewProduct, Product, ProductId, ValidateExt};
use shaku::Component;
use sqlx::{FromRow, Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, warn};

/// PostgreSQL product repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = ProductRepository)]
pub struct PgProductRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgProductRepository {
    /// Creates a new PostgreSQL product repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a product.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: f64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::new(ProductId::from_raw(row.id), row.name, row.description, row.price)
    }
}

/// Rolls back `tx` and hands back the error that caused it.
///
/// A failed rollback is logged; the caller always sees the original error.
async fn abort(tx: Transaction<'_, Postgres>, operation: &'static str, err: CatalogError) -> CatalogError {
    if let Err(rollback_err) = tx.rollback().await {
        warn!(operation, error = %rollback_err, "Transaction rollback failed");
    }
    err
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        debug!("Finding product by id: {}", id);

        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price FROM products WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Product::from))
    }

    async fn find_all(&self) -> CatalogResult<Vec<Product>> {
        debug!("Finding all products");

        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price FROM products ORDER BY id",
        )
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn create(&self, product: &NewProduct) -> CatalogResult<Product> {
        debug!("Creating product: {}", product.name);

        product.validate_request()?;

        let mut tx = self.pool.inner().begin().await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO products (name, description, price) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(e) => return Err(abort(tx, "create", e.into()).await),
        };

        tx.commit().await?;

        Ok(product.clone().into_product(ProductId::from_raw(id)))
    }

    async fn update(&self, product: &Product) -> CatalogResult<Product> {
        debug!("Updating product: {}", product.id);

        product.validate_request()?;

        let mut tx = self.pool.inner().begin().await?;

        let result = sqlx::query(
            "UPDATE products SET name = $1, description = $2, price = $3 WHERE id = $4",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.id.into_inner())
        .execute(&mut *tx)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                return Err(abort(tx, "update", CatalogError::not_found("Product", product.id)).await);
            }
            Ok(_) => {}
            Err(e) => return Err(abort(tx, "update", e.into()).await),
        }

        tx.commit().await?;

        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> CatalogResult<()> {
        debug!("Deleting product: {}", id);

        let mut tx = self.pool.inner().begin().await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                return Err(abort(tx, "delete", CatalogError::not_found("Product", id)).await);
            }
            Ok(_) => {}
            Err(e) => return Err(abort(tx, "delete", e.into()).await),
        }

        tx.commit().await?;

        Ok(())
    }
}

impl std::fmt::Debug for PgProductRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgProductRepository").finish_non_exhaustive()
    }
}
