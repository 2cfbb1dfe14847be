//! Transactional store port
//!
//! Every service operation runs inside exactly one transaction obtained from
//! an [`InventoryStore`]. Writes become visible only through
//! [`InventoryTransaction::commit`]; dropping a transaction rolls it back.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::capacity::StockLevel;
use crate::domain::entities::{
    InventoryItem, ItemFilter, ItemId, NewInventoryItem, NewWarehouse, Warehouse, WarehouseId,
};
use crate::error::DomainError;

/// Access mode requested when a transaction begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Consistent snapshot, no writes allowed
    ReadOnly,
    /// Serialized with other writers touching the same rows
    ReadWrite,
}

/// Entry point to the persistent store
#[async_trait]
pub trait InventoryStore: Send + Sync + 'static {
    type Tx: InventoryTransaction;

    /// Start a transaction
    async fn begin(&self, mode: AccessMode) -> Result<Self::Tx, DomainError>;
}

/// Reads and writes against warehouses and items within one transaction
#[async_trait]
pub trait InventoryTransaction: Send + Sync {
    // Warehouses

    /// Find a warehouse by ID
    async fn find_warehouse(&self, id: &WarehouseId) -> Result<Option<Warehouse>, DomainError>;

    /// Find a warehouse by ID and hold an exclusive lock on it until the
    /// transaction ends. Used before any capacity check that leads to a write.
    async fn lock_warehouse(&self, id: &WarehouseId) -> Result<Option<Warehouse>, DomainError>;

    /// Find a warehouse by exact name
    async fn find_warehouse_by_name(&self, name: &str) -> Result<Option<Warehouse>, DomainError>;

    /// All warehouses, ordered by name
    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, DomainError>;

    /// Warehouses whose name contains `fragment`, ignoring case, ordered by name
    async fn search_warehouses(&self, fragment: &str) -> Result<Vec<Warehouse>, DomainError>;

    async fn count_warehouses(&self) -> Result<u64, DomainError>;

    async fn insert_warehouse(&mut self, warehouse: &NewWarehouse)
        -> Result<Warehouse, DomainError>;

    /// Persist name, location and max capacity of an existing warehouse
    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> Result<Warehouse, DomainError>;

    async fn delete_warehouse(&mut self, id: &WarehouseId) -> Result<(), DomainError>;

    /// Current stock held by one warehouse, aggregated from its item rows
    async fn stock_level(&self, id: &WarehouseId) -> Result<StockLevel, DomainError>;

    /// Current stock of every warehouse that owns at least one item
    async fn stock_levels(&self) -> Result<HashMap<WarehouseId, StockLevel>, DomainError>;

    // Items

    /// Find an item by ID
    async fn find_item(&self, id: &ItemId) -> Result<Option<InventoryItem>, DomainError>;

    /// Find an item by exact SKU, optionally restricted to one warehouse
    async fn find_item_by_sku(
        &self,
        sku: &str,
        warehouse_id: Option<&WarehouseId>,
    ) -> Result<Option<InventoryItem>, DomainError>;

    /// Items matching the filter, ordered by SKU
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, DomainError>;

    async fn insert_item(&mut self, item: &NewInventoryItem)
        -> Result<InventoryItem, DomainError>;

    /// Persist every mutable field of an existing item
    async fn update_item(&mut self, item: &InventoryItem) -> Result<InventoryItem, DomainError>;

    async fn delete_item(&mut self, id: &ItemId) -> Result<(), DomainError>;

    /// Distinct non-empty categories, sorted
    async fn distinct_categories(&self) -> Result<Vec<String>, DomainError>;

    /// Make every write of this transaction visible atomically
    async fn commit(self) -> Result<(), DomainError>;
}
