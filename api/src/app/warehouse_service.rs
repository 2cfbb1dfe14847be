//! Warehouse service
//!
//! Warehouse CRUD and name search. Capacity figures are recomputed from the
//! item rows inside the same transaction on every read.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::capacity::{StockLevel, WarehouseCapacity};
use crate::domain::entities::{NewWarehouse, Warehouse, WarehouseId, WarehouseSummary};
use crate::domain::ports::{AccessMode, InventoryStore, InventoryTransaction};
use crate::error::{AppError, DomainError};

/// Service for managing warehouses
pub struct WarehouseService<S>
where
    S: InventoryStore,
{
    store: Arc<S>,
}

impl<S> WarehouseService<S>
where
    S: InventoryStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List every warehouse with its current capacity figures
    pub async fn list(&self) -> Result<Vec<WarehouseSummary>, AppError> {
        let tx = self.store.begin(AccessMode::ReadOnly).await?;
        let warehouses = tx.list_warehouses().await?;
        let stock = tx.stock_levels().await?;
        Ok(summarize_all(warehouses, &stock))
    }

    /// Get one warehouse with its current capacity figures
    pub async fn get(&self, id: &WarehouseId) -> Result<WarehouseSummary, AppError> {
        let tx = self.store.begin(AccessMode::ReadOnly).await?;
        let warehouse = tx
            .find_warehouse(id)
            .await?
            .ok_or_else(|| warehouse_not_found(id))?;
        Ok(summarize(&tx, warehouse).await?)
    }

    /// Case-insensitive substring search on warehouse names
    pub async fn search(&self, name: &str) -> Result<Vec<WarehouseSummary>, AppError> {
        let tx = self.store.begin(AccessMode::ReadOnly).await?;
        let warehouses = tx.search_warehouses(name.trim()).await?;
        let stock = tx.stock_levels().await?;
        Ok(summarize_all(warehouses, &stock))
    }

    /// True when no warehouse exists yet
    pub async fn is_empty(&self) -> Result<bool, AppError> {
        let tx = self.store.begin(AccessMode::ReadOnly).await?;
        Ok(tx.count_warehouses().await? == 0)
    }

    /// Create a warehouse. Names are unique.
    pub async fn create(&self, new: &NewWarehouse) -> Result<WarehouseSummary, AppError> {
        new.validate()?;

        let mut tx = self.store.begin(AccessMode::ReadWrite).await?;

        if tx.find_warehouse_by_name(&new.name).await?.is_some() {
            return Err(duplicate_name(&new.name).into());
        }

        let warehouse = tx.insert_warehouse(new).await?;
        tx.commit().await?;

        tracing::info!(
            warehouse_id = %warehouse.id,
            name = %warehouse.name,
            max_capacity = warehouse.max_capacity,
            "Created warehouse"
        );

        Ok(WarehouseSummary {
            capacity: WarehouseCapacity::new(warehouse.max_capacity, StockLevel::default()),
            warehouse,
        })
    }

    /// Replace a warehouse's name, location and capacity.
    ///
    /// The new capacity may not be lower than the stock already held.
    pub async fn update(
        &self,
        id: &WarehouseId,
        changes: &NewWarehouse,
    ) -> Result<WarehouseSummary, AppError> {
        changes.validate()?;

        let mut tx = self.store.begin(AccessMode::ReadWrite).await?;
        let mut warehouse = tx
            .lock_warehouse(id)
            .await?
            .ok_or_else(|| warehouse_not_found(id))?;

        if warehouse.name != changes.name {
            if let Some(other) = tx.find_warehouse_by_name(&changes.name).await? {
                if other.id != warehouse.id {
                    return Err(duplicate_name(&changes.name).into());
                }
            }
        }

        let stock = tx.stock_level(id).await?;
        WarehouseCapacity::new(warehouse.max_capacity, stock)
            .ensure_can_resize_to(changes.max_capacity)?;

        warehouse.name = changes.name.clone();
        warehouse.location = changes.location.clone();
        warehouse.max_capacity = changes.max_capacity;

        let warehouse = tx.update_warehouse(&warehouse).await?;
        tx.commit().await?;

        tracing::info!(warehouse_id = %warehouse.id, "Updated warehouse");

        Ok(WarehouseSummary {
            capacity: WarehouseCapacity::new(warehouse.max_capacity, stock),
            warehouse,
        })
    }

    /// Delete an empty warehouse. Items are never removed as a side effect.
    pub async fn delete(&self, id: &WarehouseId) -> Result<(), AppError> {
        let mut tx = self.store.begin(AccessMode::ReadWrite).await?;
        tx.lock_warehouse(id)
            .await?
            .ok_or_else(|| warehouse_not_found(id))?;

        let stock = tx.stock_level(id).await?;
        if stock.item_count > 0 {
            return Err(DomainError::InvalidState(format!(
                "Cannot delete warehouse. It contains {} items. \
                 Please remove or transfer all items before deleting.",
                stock.item_count
            ))
            .into());
        }

        tx.delete_warehouse(id).await?;
        tx.commit().await?;

        tracing::info!(warehouse_id = %id, "Deleted warehouse");
        Ok(())
    }
}

async fn summarize<T: InventoryTransaction>(
    tx: &T,
    warehouse: Warehouse,
) -> Result<WarehouseSummary, DomainError> {
    let stock = tx.stock_level(&warehouse.id).await?;
    Ok(WarehouseSummary {
        capacity: WarehouseCapacity::new(warehouse.max_capacity, stock),
        warehouse,
    })
}

fn summarize_all(
    warehouses: Vec<Warehouse>,
    stock: &HashMap<WarehouseId, StockLevel>,
) -> Vec<WarehouseSummary> {
    warehouses
        .into_iter()
        .map(|warehouse| {
            let level = stock.get(&warehouse.id).copied().unwrap_or_default();
            WarehouseSummary {
                capacity: WarehouseCapacity::new(warehouse.max_capacity, level),
                warehouse,
            }
        })
        .collect()
}

pub(crate) fn warehouse_not_found(id: &WarehouseId) -> DomainError {
    DomainError::NotFound(format!("Warehouse not found with id: {}", id))
}

fn duplicate_name(name: &str) -> DomainError {
    DomainError::AlreadyExists(format!("Warehouse with name '{}' already exists", name))
}
