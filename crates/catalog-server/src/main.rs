//! # Catalog Server
//!
//! Main entry point: loads configuration, connects PostgreSQL and Redis,
//! serves `GET /product/{id}` until a shutdown signal arrives.

use catalog_config::{AppConfig, ConfigLoader};
use catalog_core::{CatalogError, CatalogResult};
use catalog_repository::{create_pool, DatabasePoolInterface};
use catalog_rest::create_router;
use catalog_server::{di::build_catalog_module, logging::init_logging, startup};
use catalog_service::{create_redis_pool, LookupTimeouts, RedisCacheService};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.get(),
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.observability);

    startup::print_banner();
    info!("Starting catalog server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    if let Err(e) = run(config).await {
        error!(code = e.error_code(), "Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> CatalogResult<()> {
    let db_pool = create_pool(&config.database).await?;

    if config.database.run_migrations {
        db_pool.run_migrations().await?;
    }

    let cache_pool = create_redis_pool(&config.redis)?;
    if let Some(pool) = &cache_pool {
        RedisCacheService::new(pool.clone()).ping().await?;
        info!("Redis connection verified");
    }

    let module = build_catalog_module(
        &db_pool,
        cache_pool.clone(),
        LookupTimeouts::from_config(&config),
    );

    let router = create_router(module.as_ref(), &config.server);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to bind {addr}: {e}")))?;

    startup::print_startup_info(&config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CatalogError::Internal(format!("REST server error: {e}")))?;

    db_pool.close().await;
    if let Some(pool) = cache_pool {
        pool.close();
        info!("Redis connection pool closed");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
