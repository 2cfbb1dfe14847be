//! In-memory implementation of the store ports
//!
//! A transaction takes the store's lock for its whole lifetime and works on a
//! private copy of the data. `commit` writes the copy back; dropping the
//! transaction discards it. The same uniqueness rules as the database schema
//! are enforced on writes.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::capacity::StockLevel;
use crate::domain::entities::{
    InventoryItem, ItemFilter, ItemId, NewInventoryItem, NewWarehouse, Warehouse, WarehouseId,
};
use crate::domain::ports::{AccessMode, InventoryStore, InventoryTransaction};
use crate::error::DomainError;

#[derive(Debug, Clone, Default)]
struct InventoryState {
    warehouses: HashMap<WarehouseId, Warehouse>,
    items: HashMap<ItemId, InventoryItem>,
}

impl InventoryState {
    fn add_warehouse(&mut self, new: &NewWarehouse) -> Result<Warehouse, DomainError> {
        if self.warehouses.values().any(|w| w.name == new.name) {
            return Err(DomainError::AlreadyExists(format!(
                "duplicate key value violates unique constraint on name '{}'",
                new.name
            )));
        }

        let warehouse = Warehouse {
            id: WarehouseId::new(),
            name: new.name.clone(),
            location: new.location.clone(),
            max_capacity: new.max_capacity,
            created_at: Utc::now(),
        };
        self.warehouses.insert(warehouse.id, warehouse.clone());
        Ok(warehouse)
    }

    fn add_item(&mut self, new: &NewInventoryItem) -> Result<InventoryItem, DomainError> {
        let item = InventoryItem {
            id: ItemId::new(),
            sku: new.sku.clone(),
            name: new.name.clone(),
            description: new.description.clone(),
            category: new.category.clone(),
            quantity: new.quantity,
            storage_location: new.storage_location.clone(),
            warehouse_id: new.warehouse_id,
            created_at: Utc::now(),
        };
        self.check_item_row(&item)?;
        self.items.insert(item.id, item.clone());
        Ok(item)
    }

    /// Foreign key and (sku, warehouse) uniqueness
    fn check_item_row(&self, item: &InventoryItem) -> Result<(), DomainError> {
        if !self.warehouses.contains_key(&item.warehouse_id) {
            return Err(DomainError::InvalidState(format!(
                "foreign key violation: warehouse {} does not exist",
                item.warehouse_id
            )));
        }

        let clash = self.items.values().any(|other| {
            other.id != item.id && other.sku == item.sku && other.warehouse_id == item.warehouse_id
        });
        if clash {
            return Err(DomainError::AlreadyExists(format!(
                "duplicate key value violates unique constraint on (sku, warehouse_id) '{}'",
                item.sku
            )));
        }
        Ok(())
    }

    fn sorted_warehouses(&self, keep: impl Fn(&Warehouse) -> bool) -> Vec<Warehouse> {
        let mut warehouses: Vec<Warehouse> = self
            .warehouses
            .values()
            .filter(|w| keep(w))
            .cloned()
            .collect();
        warehouses.sort_by(|a, b| a.name.cmp(&b.name));
        warehouses
    }
}

// ============================================================================
// In-Memory Inventory Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryInventoryStore {
    state: Arc<Mutex<InventoryState>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> tokio::sync::MutexGuard<'_, InventoryState> {
        self.state
            .try_lock()
            .expect("store is locked by an open transaction")
    }

    /// Insert a warehouse without going through a service
    pub fn insert_warehouse_directly(&self, new: NewWarehouse) -> Warehouse {
        self.snapshot()
            .add_warehouse(&new)
            .expect("fixture warehouse should be valid")
    }

    /// Insert an item without any capacity or SKU-scope checks
    pub fn insert_item_directly(&self, new: NewInventoryItem) -> InventoryItem {
        self.snapshot()
            .add_item(&new)
            .expect("fixture item should be valid")
    }

    pub fn item_count(&self) -> usize {
        self.snapshot().items.len()
    }

    pub fn total_quantity(&self, warehouse_id: &WarehouseId) -> i64 {
        self.snapshot()
            .items
            .values()
            .filter(|item| item.warehouse_id == *warehouse_id)
            .map(|item| i64::from(item.quantity))
            .sum()
    }

    /// True when no warehouse holds two rows with the same SKU
    pub fn skus_unique_per_warehouse(&self) -> bool {
        let state = self.snapshot();
        let mut seen = std::collections::HashSet::new();
        state
            .items
            .values()
            .all(|item| seen.insert((item.warehouse_id, item.sku.clone())))
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self, mode: AccessMode) -> Result<Self::Tx, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(InMemoryTransaction {
            guard,
            working,
            mode,
        })
    }
}

// ============================================================================
// In-Memory Transaction
// ============================================================================

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<InventoryState>,
    working: InventoryState,
    mode: AccessMode,
}

impl InMemoryTransaction {
    fn writable(&mut self) -> Result<&mut InventoryState, DomainError> {
        match self.mode {
            AccessMode::ReadWrite => Ok(&mut self.working),
            AccessMode::ReadOnly => Err(DomainError::Database(
                "cannot execute write in a read-only transaction".to_string(),
            )),
        }
    }
}

#[async_trait]
impl InventoryTransaction for InMemoryTransaction {
    async fn find_warehouse(&self, id: &WarehouseId) -> Result<Option<Warehouse>, DomainError> {
        Ok(self.working.warehouses.get(id).cloned())
    }

    async fn lock_warehouse(&self, id: &WarehouseId) -> Result<Option<Warehouse>, DomainError> {
        // The whole store is already held by this transaction
        self.find_warehouse(id).await
    }

    async fn find_warehouse_by_name(&self, name: &str) -> Result<Option<Warehouse>, DomainError> {
        Ok(self
            .working
            .warehouses
            .values()
            .find(|w| w.name == name)
            .cloned())
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, DomainError> {
        Ok(self.working.sorted_warehouses(|_| true))
    }

    async fn search_warehouses(&self, name: &str) -> Result<Vec<Warehouse>, DomainError> {
        let needle = name.to_lowercase();
        Ok(self
            .working
            .sorted_warehouses(|w| w.name.to_lowercase().contains(&needle)))
    }

    async fn count_warehouses(&self) -> Result<u64, DomainError> {
        Ok(self.working.warehouses.len() as u64)
    }

    async fn insert_warehouse(&mut self, new: &NewWarehouse) -> Result<Warehouse, DomainError> {
        self.writable()?.add_warehouse(new)
    }

    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> Result<Warehouse, DomainError> {
        let state = self.writable()?;
        if state
            .warehouses
            .values()
            .any(|w| w.id != warehouse.id && w.name == warehouse.name)
        {
            return Err(DomainError::AlreadyExists(format!(
                "duplicate key value violates unique constraint on name '{}'",
                warehouse.name
            )));
        }

        let stored = state.warehouses.get_mut(&warehouse.id).ok_or_else(|| {
            DomainError::NotFound(format!("Warehouse not found with id: {}", warehouse.id))
        })?;
        *stored = warehouse.clone();
        Ok(warehouse.clone())
    }

    async fn delete_warehouse(&mut self, id: &WarehouseId) -> Result<(), DomainError> {
        let state = self.writable()?;
        if state.items.values().any(|item| item.warehouse_id == *id) {
            return Err(DomainError::InvalidState(format!(
                "foreign key violation: warehouse {} still has items",
                id
            )));
        }
        state.warehouses.remove(id);
        Ok(())
    }

    async fn stock_level(&self, id: &WarehouseId) -> Result<StockLevel, DomainError> {
        Ok(StockLevel::of(
            self.working
                .items
                .values()
                .filter(|item| item.warehouse_id == *id),
        ))
    }

    async fn stock_levels(&self) -> Result<HashMap<WarehouseId, StockLevel>, DomainError> {
        let mut by_warehouse: HashMap<WarehouseId, Vec<&InventoryItem>> = HashMap::new();
        for item in self.working.items.values() {
            by_warehouse.entry(item.warehouse_id).or_default().push(item);
        }
        Ok(by_warehouse
            .into_iter()
            .map(|(id, items)| (id, StockLevel::of(items)))
            .collect())
    }

    async fn find_item(&self, id: &ItemId) -> Result<Option<InventoryItem>, DomainError> {
        Ok(self.working.items.get(id).cloned())
    }

    async fn find_item_by_sku(
        &self,
        sku: &str,
        warehouse_id: Option<&WarehouseId>,
    ) -> Result<Option<InventoryItem>, DomainError> {
        Ok(self
            .working
            .items
            .values()
            .find(|item| item.sku == sku && warehouse_id.map_or(true, |w| item.warehouse_id == *w))
            .cloned())
    }

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, DomainError> {
        let mut items: Vec<InventoryItem> = self
            .working
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.sku.cmp(&b.sku).then(a.created_at.cmp(&b.created_at)));
        Ok(items)
    }

    async fn insert_item(&mut self, new: &NewInventoryItem) -> Result<InventoryItem, DomainError> {
        self.writable()?.add_item(new)
    }

    async fn update_item(&mut self, item: &InventoryItem) -> Result<InventoryItem, DomainError> {
        let state = self.writable()?;
        if !state.items.contains_key(&item.id) {
            return Err(DomainError::NotFound(format!(
                "Inventory item not found with id: {}",
                item.id
            )));
        }
        state.check_item_row(item)?;
        state.items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn delete_item(&mut self, id: &ItemId) -> Result<(), DomainError> {
        self.writable()?.items.remove(id);
        Ok(())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, DomainError> {
        let mut categories: Vec<String> = self
            .working
            .items
            .values()
            .filter_map(|item| item.category.clone())
            .filter(|c| !c.trim().is_empty())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn commit(mut self) -> Result<(), DomainError> {
        if self.mode == AccessMode::ReadWrite {
            *self.guard = std::mem::take(&mut self.working);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{new_item, new_warehouse};

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() {
        let store = InMemoryInventoryStore::new();

        {
            let mut tx = store.begin(AccessMode::ReadWrite).await.unwrap();
            tx.insert_warehouse(&new_warehouse("Main", 10)).await.unwrap();
        }

        let tx = store.begin(AccessMode::ReadOnly).await.unwrap();
        assert_eq!(tx.count_warehouses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = InMemoryInventoryStore::new();

        let mut tx = store.begin(AccessMode::ReadWrite).await.unwrap();
        let w = tx.insert_warehouse(&new_warehouse("Main", 10)).await.unwrap();
        tx.insert_item(&new_item("X", 3, w.id)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.total_quantity(&w.id), 3);
    }

    #[tokio::test]
    async fn read_only_transactions_reject_writes() {
        let store = InMemoryInventoryStore::new();

        let mut tx = store.begin(AccessMode::ReadOnly).await.unwrap();
        let err = tx
            .insert_warehouse(&new_warehouse("Main", 10))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Database(_)));
    }

    #[tokio::test]
    async fn sku_is_unique_within_a_warehouse() {
        let store = InMemoryInventoryStore::new();
        let w = store.insert_warehouse_directly(new_warehouse("Main", 10));
        store.insert_item_directly(new_item("X", 1, w.id));

        let mut tx = store.begin(AccessMode::ReadWrite).await.unwrap();
        assert!(tx.insert_item(&new_item("X", 1, w.id)).await.is_err());
    }

    #[tokio::test]
    async fn categories_skip_blank_values() {
        let store = InMemoryInventoryStore::new();
        let w = store.insert_warehouse_directly(new_warehouse("Main", 10));
        for (sku, category) in [("A", "Tools"), ("B", " "), ("C", "Tools")] {
            let mut item = new_item(sku, 1, w.id);
            item.category = Some(category.to_string());
            store.insert_item_directly(item);
        }

        let tx = store.begin(AccessMode::ReadOnly).await.unwrap();
        assert_eq!(tx.distinct_categories().await.unwrap(), vec!["Tools"]);
    }
}
