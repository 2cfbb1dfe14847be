//! Inventory item service
//!
//! Item CRUD, search and category listing. Every write that adds stock to a
//! warehouse checks that warehouse's free capacity under a row lock first.

use std::collections::HashMap;
use std::sync::Arc;

use crate::app::warehouse_service::warehouse_not_found;
use crate::domain::capacity::{capacity_needed_for_update, WarehouseCapacity};
use crate::domain::entities::{
    InventoryItem, ItemFilter, ItemId, ItemView, NewInventoryItem, SkuScope, WarehouseId,
};
use crate::domain::ports::{AccessMode, InventoryStore, InventoryTransaction};
use crate::error::{AppError, DomainError};

/// Service for managing inventory items
pub struct InventoryService<S>
where
    S: InventoryStore,
{
    store: Arc<S>,
    sku_scope: SkuScope,
}

impl<S> InventoryService<S>
where
    S: InventoryStore,
{
    pub fn new(store: Arc<S>, sku_scope: SkuScope) -> Self {
        Self { store, sku_scope }
    }

    /// List every item
    pub async fn list(&self) -> Result<Vec<ItemView>, AppError> {
        self.find(&ItemFilter::all()).await
    }

    /// Get one item
    pub async fn get(&self, id: &ItemId) -> Result<ItemView, AppError> {
        let tx = self.store.begin(AccessMode::ReadOnly).await?;
        let item = tx
            .find_item(id)
            .await?
            .ok_or_else(|| item_not_found(id))?;
        Ok(view(&tx, item).await?)
    }

    /// List the items held by one warehouse
    pub async fn list_by_warehouse(
        &self,
        warehouse_id: &WarehouseId,
    ) -> Result<Vec<ItemView>, AppError> {
        let tx = self.store.begin(AccessMode::ReadOnly).await?;
        let warehouse = tx
            .find_warehouse(warehouse_id)
            .await?
            .ok_or_else(|| warehouse_not_found(warehouse_id))?;

        let items = tx
            .list_items(&ItemFilter::in_warehouse(*warehouse_id))
            .await?;

        Ok(items
            .into_iter()
            .map(|item| ItemView {
                item,
                warehouse_name: Some(warehouse.name.clone()),
            })
            .collect())
    }

    /// Search by name, SKU or category, optionally within one warehouse
    pub async fn search(
        &self,
        term: Option<&str>,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<Vec<ItemView>, AppError> {
        self.find(&ItemFilter::search(term, warehouse_id)).await
    }

    /// Distinct non-empty categories, sorted
    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        let tx = self.store.begin(AccessMode::ReadOnly).await?;
        Ok(tx.distinct_categories().await?)
    }

    /// Create an item in a warehouse that has room for its quantity
    pub async fn create(&self, new: &NewInventoryItem) -> Result<ItemView, AppError> {
        new.validate()?;

        let mut tx = self.store.begin(AccessMode::ReadWrite).await?;

        ensure_sku_available(&tx, self.sku_scope, &new.sku, &new.warehouse_id, None).await?;

        let warehouse = tx
            .lock_warehouse(&new.warehouse_id)
            .await?
            .ok_or_else(|| warehouse_not_found(&new.warehouse_id))?;

        let stock = tx.stock_level(&warehouse.id).await?;
        WarehouseCapacity::new(warehouse.max_capacity, stock)
            .ensure_can_accept(i64::from(new.quantity))?;

        let item = tx.insert_item(new).await?;
        tx.commit().await?;

        tracing::info!(
            item_id = %item.id,
            sku = %item.sku,
            warehouse_id = %item.warehouse_id,
            quantity = item.quantity,
            "Created inventory item"
        );

        Ok(ItemView {
            item,
            warehouse_name: Some(warehouse.name),
        })
    }

    /// Replace an item's details, possibly moving it to another warehouse.
    ///
    /// Capacity is checked only when the warehouse changes (full quantity) or
    /// the quantity grows (the increase).
    pub async fn update(
        &self,
        id: &ItemId,
        changes: &NewInventoryItem,
    ) -> Result<ItemView, AppError> {
        changes.validate()?;

        let mut tx = self.store.begin(AccessMode::ReadWrite).await?;
        let mut item = tx
            .find_item(id)
            .await?
            .ok_or_else(|| item_not_found(id))?;

        let moving = item.warehouse_id != changes.warehouse_id;

        if item.sku != changes.sku || moving {
            ensure_sku_available(
                &tx,
                self.sku_scope,
                &changes.sku,
                &changes.warehouse_id,
                Some(&item.id),
            )
            .await?;
        }

        if moving || changes.quantity > item.quantity {
            let target = tx
                .lock_warehouse(&changes.warehouse_id)
                .await?
                .ok_or_else(|| warehouse_not_found(&changes.warehouse_id))?;

            let needed = capacity_needed_for_update(&item, &target.id, changes.quantity);
            let stock = tx.stock_level(&target.id).await?;
            WarehouseCapacity::new(target.max_capacity, stock).ensure_can_accept(needed)?;
        }

        item.sku = changes.sku.clone();
        item.name = changes.name.clone();
        item.description = changes.description.clone();
        item.category = changes.category.clone();
        item.quantity = changes.quantity;
        item.storage_location = changes.storage_location.clone();
        item.warehouse_id = changes.warehouse_id;

        let item = tx.update_item(&item).await?;
        let view = view(&tx, item).await?;
        tx.commit().await?;

        tracing::info!(item_id = %id, moved = moving, "Updated inventory item");
        Ok(view)
    }

    /// Delete an item
    pub async fn delete(&self, id: &ItemId) -> Result<(), AppError> {
        let mut tx = self.store.begin(AccessMode::ReadWrite).await?;
        tx.find_item(id)
            .await?
            .ok_or_else(|| item_not_found(id))?;

        tx.delete_item(id).await?;
        tx.commit().await?;

        tracing::info!(item_id = %id, "Deleted inventory item");
        Ok(())
    }

    async fn find(&self, filter: &ItemFilter) -> Result<Vec<ItemView>, AppError> {
        let tx = self.store.begin(AccessMode::ReadOnly).await?;
        let items = tx.list_items(filter).await?;
        let names: HashMap<WarehouseId, String> = tx
            .list_warehouses()
            .await?
            .into_iter()
            .map(|w| (w.id, w.name))
            .collect();

        tracing::debug!(
            term = ?filter.term,
            warehouse_id = ?filter.warehouse_id,
            matches = items.len(),
            "Item query"
        );

        Ok(items
            .into_iter()
            .map(|item| ItemView {
                warehouse_name: names.get(&item.warehouse_id).cloned(),
                item,
            })
            .collect())
    }
}

/// Attach the owning warehouse's name to an item
pub(crate) async fn view<T: InventoryTransaction>(
    tx: &T,
    item: InventoryItem,
) -> Result<ItemView, DomainError> {
    let warehouse_name = tx
        .find_warehouse(&item.warehouse_id)
        .await?
        .map(|w| w.name);
    Ok(ItemView {
        item,
        warehouse_name,
    })
}

/// Fail with `AlreadyExists` when `sku` is taken within the configured scope
/// by any item other than `exclude`
async fn ensure_sku_available<T: InventoryTransaction>(
    tx: &T,
    scope: SkuScope,
    sku: &str,
    warehouse_id: &WarehouseId,
    exclude: Option<&ItemId>,
) -> Result<(), DomainError> {
    let existing = tx
        .find_item_by_sku(sku, scope.restrict_to(warehouse_id))
        .await?;

    match existing {
        Some(other) if Some(&other.id) != exclude => Err(DomainError::AlreadyExists(format!(
            "Item with SKU '{}' already exists",
            sku
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn item_not_found(id: &ItemId) -> DomainError {
    DomainError::NotFound(format!("Inventory item not found with id: {}", id))
}
