//! Transfer service
//!
//! Moves stock between warehouses in a single transaction. A transfer either
//! relocates a whole item row, merges into a destination row with the same
//! SKU, or splits the row and creates a new destination row under a derived
//! SKU. See [`crate::domain::capacity::plan_transfer`] for the decision.

use std::sync::Arc;

use rand::Rng;

use crate::app::item_service::item_not_found;
use crate::domain::capacity::{check_transfer_source, plan_transfer, TransferPlan, WarehouseCapacity};
use crate::domain::entities::{
    InventoryItem, ItemId, ItemView, NewInventoryItem, SkuScope, TransferRequest, Warehouse,
    WarehouseId,
};
use crate::domain::ports::{AccessMode, InventoryStore, InventoryTransaction};
use crate::error::{AppError, DomainError};

/// Attempts at finding an unused derived SKU before giving up
pub const MAX_SKU_ATTEMPTS: usize = 8;

/// Service for moving stock between warehouses
pub struct TransferService<S>
where
    S: InventoryStore,
{
    store: Arc<S>,
    sku_scope: SkuScope,
}

impl<S> TransferService<S>
where
    S: InventoryStore,
{
    pub fn new(store: Arc<S>, sku_scope: SkuScope) -> Self {
        Self { store, sku_scope }
    }

    /// Transfer `request.quantity` units of an item to another warehouse.
    ///
    /// Returns the destination row, or the original row when it was moved whole.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<ItemView, AppError> {
        request.validate()?;

        let mut tx = self.store.begin(AccessMode::ReadWrite).await?;

        let mut item = tx
            .find_item(&request.item_id)
            .await?
            .ok_or_else(|| item_not_found(&request.item_id))?;

        if let Err(e) = check_transfer_source(&item, request) {
            tracing::warn!(item_id = %item.id, error = %e, "Rejected transfer");
            return Err(e.into());
        }

        let destination = lock_pair(
            &tx,
            &request.source_warehouse_id,
            &request.destination_warehouse_id,
        )
        .await?;

        let stock = tx.stock_level(&destination.id).await?;
        let capacity = WarehouseCapacity::new(destination.max_capacity, stock);
        let existing = tx
            .find_item_by_sku(&item.sku, Some(&destination.id))
            .await?;

        let plan = match plan_transfer(&item, request.quantity, &capacity, existing.as_ref()) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(item_id = %item.id, error = %e, "Rejected transfer");
                return Err(e.into());
            }
        };

        let result = match plan {
            TransferPlan::Relocate => {
                item.warehouse_id = destination.id;
                tx.update_item(&item).await?
            }
            TransferPlan::MergeAll { into } => {
                let mut target = merge_target(existing, into, &destination)?;
                target.quantity += request.quantity;
                let target = tx.update_item(&target).await?;
                tx.delete_item(&item.id).await?;
                target
            }
            TransferPlan::SplitMerge { remaining, into } => {
                item.quantity = remaining;
                tx.update_item(&item).await?;

                let mut target = merge_target(existing, into, &destination)?;
                target.quantity += request.quantity;
                tx.update_item(&target).await?
            }
            TransferPlan::SplitNew { remaining } => {
                item.quantity = remaining;
                tx.update_item(&item).await?;

                let sku = derive_sku(
                    &tx,
                    &item.sku,
                    self.sku_scope.restrict_to(&destination.id),
                    random_suffix,
                )
                .await?;
                let split =
                    NewInventoryItem::split_from(&item, sku, request.quantity, destination.id);
                tx.insert_item(&split).await?
            }
        };

        tx.commit().await?;

        tracing::info!(
            item_id = %request.item_id,
            source = %request.source_warehouse_id,
            destination = %destination.id,
            quantity = request.quantity,
            plan = ?plan,
            result_id = %result.id,
            "Transferred inventory"
        );

        Ok(ItemView {
            item: result,
            warehouse_name: Some(destination.name),
        })
    }
}

/// Lock both warehouses in id order so concurrent transfers in opposite
/// directions cannot deadlock. Returns the destination.
async fn lock_pair<T: InventoryTransaction>(
    tx: &T,
    source: &WarehouseId,
    destination: &WarehouseId,
) -> Result<Warehouse, DomainError> {
    let (first, second) = if source <= destination {
        (source, destination)
    } else {
        (destination, source)
    };

    let mut locked = Vec::with_capacity(2);
    for id in [first, second] {
        locked.push(tx.lock_warehouse(id).await?);
    }

    locked
        .into_iter()
        .flatten()
        .find(|w| w.id == *destination)
        .ok_or_else(|| {
            DomainError::NotFound(format!(
                "Destination warehouse not found with id: {}",
                destination
            ))
        })
}

/// Derive an unused SKU of the form `<base>-<suffix>`.
///
/// `scope` limits the uniqueness check to one warehouse; `None` checks every
/// warehouse. Fails after [`MAX_SKU_ATTEMPTS`] collisions.
pub async fn derive_sku<T, F>(
    tx: &T,
    base: &str,
    scope: Option<&WarehouseId>,
    mut next_suffix: F,
) -> Result<String, DomainError>
where
    T: InventoryTransaction,
    F: FnMut() -> String + Send,
{
    for _ in 0..MAX_SKU_ATTEMPTS {
        let candidate = format!("{}-{}", base, next_suffix());
        if tx.find_item_by_sku(&candidate, scope).await?.is_none() {
            return Ok(candidate);
        }
        tracing::debug!(sku = %candidate, "Derived SKU already taken");
    }

    Err(DomainError::Internal(format!(
        "Could not derive a unique SKU from '{}' after {} attempts",
        base, MAX_SKU_ATTEMPTS
    )))
}

/// Eight lowercase hex digits
fn random_suffix() -> String {
    format!("{:08x}", rand::thread_rng().gen::<u32>())
}

/// The destination row the plan merges into
fn merge_target(
    existing: Option<InventoryItem>,
    into: ItemId,
    destination: &Warehouse,
) -> Result<InventoryItem, DomainError> {
    existing.filter(|item| item.id == into).ok_or_else(|| {
        DomainError::Internal(format!(
            "Merge target {} vanished from warehouse {}",
            into, destination.id
        ))
    })
}
