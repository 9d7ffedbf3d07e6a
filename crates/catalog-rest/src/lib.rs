//! # Catalog REST
//!
//! HTTP surface of the catalog service. Exposes a single read endpoint,
//! `GET /product/{id}`, backed by the read-through product lookup.

pub mod controllers;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
