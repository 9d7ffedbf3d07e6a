//! Validation utilities.

use crate::CatalogError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `CatalogError` on failure.
    fn validate_request(&self) -> Result<(), CatalogError> {
        self.validate().map_err(validation_errors_to_catalog_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to an `InvalidInput` error.
#[must_use]
pub fn validation_errors_to_catalog_error(errors: ValidationErrors) -> CatalogError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {message}")
            })
        })
        .collect();
    messages.sort();

    CatalogError::InvalidInput(messages.join("; "))
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that a price is a finite, non-negative amount.
    pub fn valid_price(price: f64) -> Result<(), ValidationError> {
        if !price.is_finite() {
            return Err(ValidationError::new("price_not_finite"));
        }
        if price < 0.0 {
            return Err(ValidationError::new("price_negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Widget").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_valid_price() {
        assert!(valid_price(0.0).is_ok());
        assert!(valid_price(9.99).is_ok());
        assert!(valid_price(-0.01).is_err());
        assert!(valid_price(f64::NAN).is_err());
        assert!(valid_price(f64::INFINITY).is_err());
    }
}
