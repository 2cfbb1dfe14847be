//! Test utilities
//!
//! An in-memory store with transaction semantics plus fixtures for building
//! valid warehouses and items. Service and handler tests run against these
//! instead of a live database.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
