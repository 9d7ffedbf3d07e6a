//! Product entity.

use crate::{validation::rules, ProductId};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use validator::{Validate, ValidationErrors};

/// A product as stored in the catalog.
///
/// Serialized field names match the public JSON shape,
/// `{"ID":1,"Name":"...","Description":"...","Price":9.99}`, which is also
/// the form kept in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    #[serde(rename = "ID")]
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl Product {
    /// Creates a product with a store-assigned ID.
    #[must_use]
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            price,
        }
    }
}

impl Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {}, Description: {}, Price: ${:.2}",
            self.id, self.name, self.description, self.price
        )
    }
}

impl Validate for Product {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.name, self.price)
    }
}

/// Payload for creating a product; the store assigns the ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl NewProduct {
    /// Creates a new product payload.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
        }
    }

    /// Attaches a store-assigned ID.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
        }
    }
}

impl Validate for NewProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.name, self.price)
    }
}

fn validate_fields(name: &str, price: f64) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Err(e) = rules::not_blank(name) {
        errors.add("name", e);
    }
    if let Err(e) = rules::valid_price(price) {
        errors.add("price", e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
