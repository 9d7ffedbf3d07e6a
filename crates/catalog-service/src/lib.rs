//! # Catalog Service
//!
//! Read-through product lookup. A lookup checks the cache, falls back to the
//! store on a miss, and populates the cache with the fetched product.

pub mod cache;
pub mod r#impl;
pub mod product_lookup;

pub use cache::*;
pub use product_lookup::*;
pub use r#impl::{ReadThroughProductLookup, ReadThroughProductLookupParameters};
