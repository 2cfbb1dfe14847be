//! Schema bootstrap
//!
//! Creates the tables and indexes from the entity definitions when they do
//! not exist yet. Safe to run on every start.

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

use crate::entity::{inventory_items, warehouses};

pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut warehouses_table = schema.create_table_from_entity(warehouses::Entity);
    db.execute(backend.build(warehouses_table.if_not_exists()))
        .await?;

    let mut items_table = schema.create_table_from_entity(inventory_items::Entity);
    db.execute(backend.build(items_table.if_not_exists())).await?;

    for mut index in schema.create_index_from_entity(inventory_items::Entity) {
        db.execute(backend.build(index.if_not_exists())).await?;
    }

    // A SKU appears at most once per warehouse regardless of the configured scope
    let sku_per_warehouse = Index::create()
        .name("uq_inventory_items_sku_warehouse")
        .table(inventory_items::Entity)
        .col(inventory_items::Column::Sku)
        .col(inventory_items::Column::WarehouseId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&sku_per_warehouse)).await?;

    tracing::info!("Database schema is up to date");
    Ok(())
}
