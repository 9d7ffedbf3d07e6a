//! REST API controllers.

pub mod product_controller;
