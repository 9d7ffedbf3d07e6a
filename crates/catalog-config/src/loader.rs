//! Configuration loader with layered sources.

use crate::AppConfig;
use catalog_core::{CatalogError, CatalogResult};
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix for overrides, e.g. `CATALOG_DATABASE__URL`.
pub const ENV_PREFIX: &str = "CATALOG";

/// Loads the layered application configuration.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `CATALOG_` prefix
    pub fn new(config_dir: impl Into<String>) -> CatalogResult<Self> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment = std::env::var("CATALOG_ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let config = Self::load_config(&config_dir.into(), &environment)?;

        Ok(Self { config })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> CatalogResult<Self> {
        Self::new("./config")
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn get(&self) -> AppConfig {
        self.config.clone()
    }

    /// Loads configuration for `environment` from the specified directory.
    pub fn load_config(config_dir: &str, environment: &str) -> CatalogResult<AppConfig> {
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment, "local"] {
            let path = format!("{config_dir}/{name}.toml");
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(config_error_to_catalog_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Validates the configuration.
    fn validate_config(config: &AppConfig) -> CatalogResult<()> {
        if config.database.url.trim().is_empty() {
            return Err(CatalogError::Configuration(
                "Database URL is required".to_string(),
            ));
        }

        if config.redis.enabled && config.redis.url.trim().is_empty() {
            return Err(CatalogError::Configuration(
                "Redis URL is required when Redis is enabled".to_string(),
            ));
        }

        if config.server.port == 0 {
            return Err(CatalogError::Configuration(
                "Server port must be non-zero".to_string(),
            ));
        }

        if config.server.request_timeout_secs == 0
            || config.database.connect_timeout_secs == 0
            || config.database.idle_timeout_secs == 0
            || config.database.query_timeout_ms == 0
            || config.cache.operation_timeout_ms == 0
        {
            return Err(CatalogError::Configuration(
                "Backend timeouts must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn config_error_to_catalog_error(err: ConfigError) -> CatalogError {
    CatalogError::Configuration(err.to_string())
}
