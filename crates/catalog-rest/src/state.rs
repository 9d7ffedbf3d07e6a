//! Application state for Axum handlers.

use catalog_service::ProductLookup;
use shaku::HasComponent;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub product_lookup: Arc<dyn ProductLookup>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(product_lookup: Arc<dyn ProductLookup>) -> Self {
        Self { product_lookup }
    }

    /// Resolves the handler dependencies from a Shaku module.
    pub fn from_module<M>(module: &M) -> Self
    where
        M: HasComponent<dyn ProductLookup>,
    {
        Self::new(module.resolve())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
