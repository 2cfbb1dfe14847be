//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in `crate::entity`.

pub mod item;
pub mod transfer;
pub mod warehouse;

pub use item::{InventoryItem, ItemFilter, ItemId, ItemView, NewInventoryItem, SkuScope};
pub use transfer::TransferRequest;
pub use warehouse::{NewWarehouse, Warehouse, WarehouseId, WarehouseSummary};
