//! Application layer
//!
//! Use cases over the store ports. Every operation runs inside one store
//! transaction and either commits all of its writes or none of them.

pub mod item_service;
pub mod seed;
pub mod transfer_service;
pub mod warehouse_service;

pub use item_service::InventoryService;
pub use seed::seed_sample_data;
pub use transfer_service::TransferService;
pub use warehouse_service::WarehouseService;
