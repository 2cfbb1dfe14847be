//! PostgreSQL adapter for InventoryStore
//!
//! Write transactions run SERIALIZABLE and take row locks on the warehouses
//! they touch, so capacity checks and the writes they guard see the same
//! stock. Reads run in a REPEATABLE READ snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    AccessMode as DbAccessMode, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::capacity::StockLevel;
use crate::domain::entities::{
    InventoryItem, ItemFilter, ItemId, NewInventoryItem, NewWarehouse, Warehouse, WarehouseId,
};
use crate::domain::ports::{AccessMode, InventoryStore, InventoryTransaction};
use crate::entity::{inventory_items, warehouses};
use crate::error::DomainError;

/// PostgreSQL implementation of InventoryStore
pub struct PostgresInventoryStore {
    db: DatabaseConnection,
}

impl PostgresInventoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    type Tx = PostgresTransaction;

    async fn begin(&self, mode: AccessMode) -> Result<Self::Tx, DomainError> {
        let (isolation, access) = match mode {
            AccessMode::ReadOnly => (IsolationLevel::RepeatableRead, DbAccessMode::ReadOnly),
            AccessMode::ReadWrite => (IsolationLevel::Serializable, DbAccessMode::ReadWrite),
        };

        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(access))
            .await
            .map_err(db_error)?;

        Ok(PostgresTransaction { txn })
    }
}

/// One open database transaction. Dropping it without `commit` rolls back.
pub struct PostgresTransaction {
    txn: DatabaseTransaction,
}

#[async_trait]
impl InventoryTransaction for PostgresTransaction {
    async fn find_warehouse(&self, id: &WarehouseId) -> Result<Option<Warehouse>, DomainError> {
        let result = warehouses::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(result.map(|m| m.into()))
    }

    async fn lock_warehouse(&self, id: &WarehouseId) -> Result<Option<Warehouse>, DomainError> {
        let result = warehouses::Entity::find_by_id(id.0)
            .lock_exclusive()
            .one(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_warehouse_by_name(&self, name: &str) -> Result<Option<Warehouse>, DomainError> {
        let result = warehouses::Entity::find()
            .filter(warehouses::Column::Name.eq(name))
            .one(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(result.map(|m| m.into()))
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, DomainError> {
        let results = warehouses::Entity::find()
            .order_by_asc(warehouses::Column::Name)
            .all(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn search_warehouses(&self, name: &str) -> Result<Vec<Warehouse>, DomainError> {
        let results = warehouses::Entity::find()
            .filter(contains_ci(warehouses::Column::Name, name))
            .order_by_asc(warehouses::Column::Name)
            .all(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn count_warehouses(&self) -> Result<u64, DomainError> {
        warehouses::Entity::find()
            .count(&self.txn)
            .await
            .map_err(db_error)
    }

    async fn insert_warehouse(&mut self, new: &NewWarehouse) -> Result<Warehouse, DomainError> {
        let model = warehouses::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name.clone()),
            location: Set(new.location.clone()),
            max_capacity: Set(new.max_capacity),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model.insert(&self.txn).await.map_err(db_error)?;

        Ok(result.into())
    }

    async fn update_warehouse(&mut self, warehouse: &Warehouse) -> Result<Warehouse, DomainError> {
        let result = warehouses::ActiveModel {
            id: Set(warehouse.id.0),
            name: Set(warehouse.name.clone()),
            location: Set(warehouse.location.clone()),
            max_capacity: Set(warehouse.max_capacity),
            ..Default::default()
        }
        .update(&self.txn)
        .await
        .map_err(db_error)?;

        Ok(result.into())
    }

    async fn delete_warehouse(&mut self, id: &WarehouseId) -> Result<(), DomainError> {
        warehouses::Entity::delete_by_id(id.0)
            .exec(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(())
    }

    async fn stock_level(&self, id: &WarehouseId) -> Result<StockLevel, DomainError> {
        let row = inventory_items::Entity::find()
            .select_only()
            .column_as(Expr::col(inventory_items::Column::Quantity).sum(), "total_quantity")
            .column_as(Expr::col(inventory_items::Column::Id).count(), "item_count")
            .filter(inventory_items::Column::WarehouseId.eq(id.0))
            .into_tuple::<(Option<i64>, i64)>()
            .one(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(row
            .map(|(total, count)| StockLevel {
                total_quantity: total.unwrap_or(0),
                item_count: count,
            })
            .unwrap_or_default())
    }

    async fn stock_levels(&self) -> Result<HashMap<WarehouseId, StockLevel>, DomainError> {
        let rows = inventory_items::Entity::find()
            .select_only()
            .column(inventory_items::Column::WarehouseId)
            .column_as(Expr::col(inventory_items::Column::Quantity).sum(), "total_quantity")
            .column_as(Expr::col(inventory_items::Column::Id).count(), "item_count")
            .group_by(inventory_items::Column::WarehouseId)
            .into_tuple::<(Uuid, Option<i64>, i64)>()
            .all(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, total, count)| {
                (
                    WarehouseId(id),
                    StockLevel {
                        total_quantity: total.unwrap_or(0),
                        item_count: count,
                    },
                )
            })
            .collect())
    }

    async fn find_item(&self, id: &ItemId) -> Result<Option<InventoryItem>, DomainError> {
        let result = inventory_items::Entity::find_by_id(id.0)
            .one(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_item_by_sku(
        &self,
        sku: &str,
        warehouse_id: Option<&WarehouseId>,
    ) -> Result<Option<InventoryItem>, DomainError> {
        let mut query =
            inventory_items::Entity::find().filter(inventory_items::Column::Sku.eq(sku));
        if let Some(warehouse_id) = warehouse_id {
            query = query.filter(inventory_items::Column::WarehouseId.eq(warehouse_id.0));
        }

        let result = query
            .order_by_asc(inventory_items::Column::CreatedAt)
            .one(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(result.map(|m| m.into()))
    }

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, DomainError> {
        let mut query = inventory_items::Entity::find();

        if let Some(warehouse_id) = &filter.warehouse_id {
            query = query.filter(inventory_items::Column::WarehouseId.eq(warehouse_id.0));
        }
        if let Some(term) = &filter.term {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(inventory_items::Column::Name, term))
                    .add(contains_ci(inventory_items::Column::Sku, term))
                    .add(contains_ci(inventory_items::Column::Category, term)),
            );
        }

        let results = query
            .order_by_asc(inventory_items::Column::Sku)
            .order_by_asc(inventory_items::Column::CreatedAt)
            .all(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn insert_item(&mut self, new: &NewInventoryItem) -> Result<InventoryItem, DomainError> {
        let model = inventory_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(new.sku.clone()),
            name: Set(new.name.clone()),
            description: Set(new.description.clone()),
            category: Set(new.category.clone()),
            quantity: Set(new.quantity),
            storage_location: Set(new.storage_location.clone()),
            warehouse_id: Set(new.warehouse_id.0),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model.insert(&self.txn).await.map_err(db_error)?;

        Ok(result.into())
    }

    async fn update_item(&mut self, item: &InventoryItem) -> Result<InventoryItem, DomainError> {
        let result = inventory_items::ActiveModel {
            id: Set(item.id.0),
            sku: Set(item.sku.clone()),
            name: Set(item.name.clone()),
            description: Set(item.description.clone()),
            category: Set(item.category.clone()),
            quantity: Set(item.quantity),
            storage_location: Set(item.storage_location.clone()),
            warehouse_id: Set(item.warehouse_id.0),
            ..Default::default()
        }
        .update(&self.txn)
        .await
        .map_err(db_error)?;

        Ok(result.into())
    }

    async fn delete_item(&mut self, id: &ItemId) -> Result<(), DomainError> {
        inventory_items::Entity::delete_by_id(id.0)
            .exec(&self.txn)
            .await
            .map_err(db_error)?;

        Ok(())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, DomainError> {
        let mut categories: Vec<String> = inventory_items::Entity::find()
            .select_only()
            .column(inventory_items::Column::Category)
            .distinct()
            .filter(inventory_items::Column::Category.is_not_null())
            .into_tuple::<String>()
            .all(&self.txn)
            .await
            .map_err(db_error)?
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();

        // Collation-independent order
        categories.sort();
        Ok(categories)
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.txn.commit().await.map_err(db_error)
    }
}

/// Case-insensitive substring match on a text column
fn contains_ci<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(like_pattern(term))
}

/// `%term%` with LIKE wildcards in `term` escaped, lowercased
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Map a database error onto the domain's error kinds
fn db_error(err: DbErr) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => DomainError::AlreadyExists(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => DomainError::InvalidState(msg),
        _ => {
            let msg = err.to_string();
            if is_serialization_failure(&msg) {
                DomainError::Conflict(
                    "The resource was modified concurrently. Please retry.".to_string(),
                )
            } else {
                DomainError::Database(msg)
            }
        }
    }
}

/// SQLSTATE 40001 (serialization_failure) or 40P01 (deadlock_detected)
fn is_serialization_failure(msg: &str) -> bool {
    msg.contains("40001")
        || msg.contains("40P01")
        || msg.contains("could not serialize access")
        || msg.contains("deadlock detected")
}

// ============================================================================
// Model conversions
// ============================================================================

impl From<warehouses::Model> for Warehouse {
    fn from(model: warehouses::Model) -> Self {
        Warehouse {
            id: WarehouseId(model.id),
            name: model.name,
            location: model.location,
            max_capacity: model.max_capacity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<inventory_items::Model> for InventoryItem {
    fn from(model: inventory_items::Model) -> Self {
        InventoryItem {
            id: ItemId(model.id),
            sku: model.sku,
            name: model.name,
            description: model.description,
            category: model.category,
            quantity: model.quantity,
            storage_location: model.storage_location,
            warehouse_id: WarehouseId(model.warehouse_id),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
