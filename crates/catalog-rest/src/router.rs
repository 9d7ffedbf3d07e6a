//! Main application router.

use crate::{controllers::product_controller, middleware::logging_middleware, state::AppState};
use axum::{middleware, Router};
use catalog_config::ServerConfig;
use catalog_service::ProductLookup;
use shaku::{HasComponent, Module};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Creates the main application router from a Shaku module.
///
/// The module must provide a `ProductLookup` component.
pub fn create_router<M>(module: &M, server_config: &ServerConfig) -> Router
where
    M: Module + HasComponent<dyn ProductLookup>,
{
    let state = AppState::from_module(module);
    build_router(state, server_config)
}

/// Creates the router around an already assembled state.
///
/// Requests that outlive `request_timeout_secs` are answered with
/// `408 Request Timeout`.
pub fn build_router(state: AppState, server_config: &ServerConfig) -> Router {
    let router = Router::new()
        .merge(product_controller::router())
        .layer(TimeoutLayer::new(server_config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state);

    info!("Router created with product endpoint at /product/{{id}}");
    router
}
