//! # Catalog Repository
//!
//! Store adapter for products. PostgreSQL is the source of truth; every
//! create, update and delete goes through here.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn ProductRepository>
//! PgProductRepository
//!   ↓  Arc<dyn DatabasePoolInterface>
//! PostgreSQL
//! ```

pub mod pool;
pub mod postgres;
pub mod traits;

pub use pool::*;
pub use postgres::*;
pub use traits::*;
