//! PostgreSQL adapters
//!
//! Implementation of the store ports using SeaORM and PostgreSQL.

pub mod schema;
pub mod store;


pub use schema::ensure_schema;
pub use store::PostgresInventoryStore;
