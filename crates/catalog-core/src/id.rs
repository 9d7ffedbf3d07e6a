//! Typed ID wrapper for products.

use crate::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A strongly-typed wrapper for store-assigned product IDs.
///
/// IDs are positive integers; zero and negative values never identify a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Creates a product ID from a raw store value.
    #[must_use]
    pub const fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Parses a product ID from a path segment.
    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        let raw: i64 = s
            .parse()
            .map_err(|_| CatalogError::invalid_input(format!("Invalid product ID: {s}")))?;

        if raw <= 0 {
            return Err(CatalogError::invalid_input(format!(
                "Product ID must be positive: {s}"
            )));
        }

        Ok(Self(raw))
    }

    /// Returns the inner integer.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}
