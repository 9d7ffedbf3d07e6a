//! Unified error types for all layers of the catalog service.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for the catalog service.
///
/// Variants follow the lookup path: caller input, the durable store, the
/// cache, and the serialization boundary between them.
#[derive(Error, Debug)]
pub enum CatalogError {
    // ============ Caller Errors ============
    /// Malformed identifier or invalid payload
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    // ============ Backend Errors ============
    /// Store query, pool or deadline failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Cache transport, pool or deadline failure
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Cached value could not be decoded
    #[error("Cache corruption: {0}")]
    CacheCorruption(String),

    /// Entity could not be encoded
    #[error("Serialization failure: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound { .. } => 404,
            Self::StoreUnavailable(_)
            | Self::CacheUnavailable(_)
            | Self::CacheCorruption(_)
            | Self::Serialization(_)
            | Self::Configuration(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            Self::CacheCorruption(_) => "CACHE_CORRUPTION",
            Self::Serialization(_) => "SERIALIZATION_FAILURE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input<T: Into<String>>(message: T) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns `true` if a backend was unreachable or too slow.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::CacheUnavailable(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            _ => Self::StoreUnavailable(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
