//! PostgreSQL-backed repositories.

mod product_repository;

pub use product_repository::*;
