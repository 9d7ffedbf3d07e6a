//! Product lookup implementations.
//!
//! Trait definitions live in the parent module (`product_lookup.rs`).

pub mod product_lookup_impl;

pub use product_lookup_impl::{ReadThroughProductLookup, ReadThroughProductLookupParameters};
