//! # Catalog Core
//!
//! Core types, traits, and error definitions for the catalog service.
//! This crate provides the foundational abstractions shared by the store,
//! cache, service and HTTP layers.

pub mod clock;
pub mod error;
pub mod id;
pub mod product;
pub mod result;
pub mod validation;

pub use clock::*;
pub use error::*;
pub use id::*;
pub use product::*;
pub use result::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::{module, HasComponent, Interface};
