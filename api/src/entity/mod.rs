//! SeaORM entity definitions

pub mod inventory_items;
pub mod warehouses;
