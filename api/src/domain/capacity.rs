//! Capacity accounting and transfer planning
//!
//! Everything here is pure: callers load the current item rows inside a
//! transaction, hand the figures in, and apply the resulting decision.

use crate::domain::entities::{InventoryItem, ItemId, TransferRequest, WarehouseId};
use crate::error::DomainError;

/// Aggregate of the item rows a warehouse owns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockLevel {
    /// Sum of item quantities
    pub total_quantity: i64,
    /// Number of item rows
    pub item_count: i64,
}

impl StockLevel {
    pub fn of<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Self {
        items
            .into_iter()
            .fold(StockLevel::default(), |acc, item| StockLevel {
                total_quantity: acc.total_quantity + i64::from(item.quantity),
                item_count: acc.item_count + 1,
            })
    }
}

/// Capacity figures for one warehouse at one point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarehouseCapacity {
    pub max_capacity: i32,
    pub current: i64,
    pub item_count: i64,
}

impl WarehouseCapacity {
    pub fn new(max_capacity: i32, stock: StockLevel) -> Self {
        Self {
            max_capacity,
            current: stock.total_quantity,
            item_count: stock.item_count,
        }
    }

    pub fn available(&self) -> i64 {
        i64::from(self.max_capacity) - self.current
    }

    /// Percentage of `max_capacity` in use; 0 for a zero-capacity warehouse
    pub fn utilization_percentage(&self) -> f64 {
        if self.max_capacity == 0 {
            return 0.0;
        }
        (self.current as f64 / f64::from(self.max_capacity)) * 100.0
    }

    pub fn can_accept(&self, quantity: i64) -> bool {
        quantity <= self.available()
    }

    pub fn ensure_can_accept(&self, quantity: i64) -> Result<(), DomainError> {
        if self.can_accept(quantity) {
            Ok(())
        } else {
            Err(DomainError::InsufficientCapacity(format!(
                "Insufficient warehouse capacity. Available: {}, Required: {}",
                self.available(),
                quantity
            )))
        }
    }

    /// A warehouse can never be shrunk below the stock it already holds
    pub fn ensure_can_resize_to(&self, max_capacity: i32) -> Result<(), DomainError> {
        if i64::from(max_capacity) < self.current {
            return Err(DomainError::InvalidArgument(format!(
                "Cannot reduce capacity to {}. Current usage is {} items.",
                max_capacity, self.current
            )));
        }
        Ok(())
    }
}

/// Capacity the target warehouse must have free for an item edit to succeed.
///
/// Moving warehouses needs room for the full new quantity; staying put only
/// needs room for an increase.
pub fn capacity_needed_for_update(
    current: &InventoryItem,
    target_warehouse: &WarehouseId,
    new_quantity: i32,
) -> i64 {
    if current.warehouse_id != *target_warehouse {
        i64::from(new_quantity)
    } else if new_quantity > current.quantity {
        i64::from(new_quantity - current.quantity)
    } else {
        0
    }
}

/// Check the request against the item as it is stored now
pub fn check_transfer_source(
    item: &InventoryItem,
    request: &TransferRequest,
) -> Result<(), DomainError> {
    if item.warehouse_id != request.source_warehouse_id {
        return Err(DomainError::InvalidArgument(
            "Item is not in the specified source warehouse".to_string(),
        ));
    }

    if request.source_warehouse_id == request.destination_warehouse_id {
        return Err(DomainError::InvalidArgument(
            "Source and destination warehouses must be different".to_string(),
        ));
    }

    if request.quantity > item.quantity {
        return Err(DomainError::InvalidArgument(format!(
            "Transfer quantity ({}) exceeds available quantity ({})",
            request.quantity, item.quantity
        )));
    }

    Ok(())
}

/// What a transfer does to the item rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPlan {
    /// Move the whole row to the destination, keeping its id and SKU
    Relocate,
    /// Add every unit to an existing destination row with the same SKU and
    /// delete the now-empty source row
    MergeAll { into: ItemId },
    /// Keep `remaining` units at the source and add the rest to an existing
    /// destination row with the same SKU
    SplitMerge { remaining: i32, into: ItemId },
    /// Keep `remaining` units at the source and create a new destination row
    /// under a derived SKU
    SplitNew { remaining: i32 },
}

/// Decide how to move `quantity` units of `item` into the destination.
///
/// `destination_match` is the destination row carrying the same SKU, if any.
/// Assumes [`check_transfer_source`] already passed.
pub fn plan_transfer(
    item: &InventoryItem,
    quantity: i32,
    destination: &WarehouseCapacity,
    destination_match: Option<&InventoryItem>,
) -> Result<TransferPlan, DomainError> {
    if !destination.can_accept(i64::from(quantity)) {
        return Err(DomainError::InsufficientCapacity(format!(
            "Insufficient capacity in destination warehouse. Available: {}, Required: {}",
            destination.available(),
            quantity
        )));
    }

    let plan = match (quantity == item.quantity, destination_match) {
        (true, None) => TransferPlan::Relocate,
        (true, Some(existing)) => TransferPlan::MergeAll { into: existing.id },
        (false, Some(existing)) => TransferPlan::SplitMerge {
            remaining: item.quantity - quantity,
            into: existing.id,
        },
        (false, None) => TransferPlan::SplitNew {
            remaining: item.quantity - quantity,
        },
    };

    Ok(plan)
}
