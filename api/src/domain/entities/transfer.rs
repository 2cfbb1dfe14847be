//! Transfer request
//!
//! Moves some or all units of an item from one warehouse to another.

use super::item::ItemId;
use super::warehouse::WarehouseId;
use crate::domain::validation::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub item_id: ItemId,
    pub source_warehouse_id: WarehouseId,
    pub destination_warehouse_id: WarehouseId,
    pub quantity: i32,
}

impl TransferRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.quantity < 1 {
            errors.add("quantity", "Transfer quantity must be at least 1");
        }
        errors.into_result()
    }
}
