//! Product controller.

use crate::{
    responses::{ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use catalog_core::{CatalogError, Product, ProductId};
use tracing::error;

/// Creates the product router.
pub fn router() -> Router<AppState> {
    Router::new().route("/product/:id", get(get_product))
}

/// Get a product by ID.
///
/// Answers `200` with the product JSON, `400` for an identifier that is not a
/// positive integer, `404` when the store has no such product and `500` for
/// any backend failure.
pub async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Product>> {
    let id = ProductId::parse(&raw_id).map_err(|_| AppError::bad_request("Invalid product ID"))?;

    state
        .product_lookup
        .get_by_id(id)
        .await
        .map(Json)
        .map_err(|e| lookup_error(id, &e))
}

fn lookup_error(id: ProductId, err: &CatalogError) -> AppError {
    match err {
        CatalogError::NotFound { .. } => AppError::not_found("Product not found"),
        CatalogError::InvalidInput(_) => AppError::bad_request("Invalid product ID"),
        _ => {
            error!(
                product_id = %id,
                operation = "get_product",
                code = err.error_code(),
                error = %err,
                "Failed to retrieve product"
            );
            AppError::internal("Failed to retrieve product")
        }
    }
}
