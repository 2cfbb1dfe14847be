//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture returns a valid value that tests can customize.

use crate::domain::entities::{NewInventoryItem, NewWarehouse, WarehouseId};

/// A valid warehouse with the given name and capacity
pub fn new_warehouse(name: &str, max_capacity: i32) -> NewWarehouse {
    NewWarehouse {
        name: name.to_string(),
        location: "Test City".to_string(),
        max_capacity,
    }
}

/// A valid item named after its SKU, with no optional fields set
pub fn new_item(sku: &str, quantity: i32, warehouse_id: WarehouseId) -> NewInventoryItem {
    NewInventoryItem {
        sku: sku.to_string(),
        name: format!("Item {}", sku),
        description: None,
        category: None,
        quantity,
        storage_location: None,
        warehouse_id,
    }
}
