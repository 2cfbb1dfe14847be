//! Inventory item handlers
//!
//! Endpoints for item management, search and transfers between warehouses.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{ItemId, ItemView, NewInventoryItem, TransferRequest, WarehouseId};
use crate::domain::ports::InventoryStore;
use crate::domain::validation::FieldErrors;
use crate::error::AppError;
use crate::handlers::{json_body, path_param, query_params};
use crate::AppState;

/// Body for creating or replacing an item
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub storage_location: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

impl ItemRequest {
    fn into_new_item(self) -> Result<NewInventoryItem, FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.quantity.is_none() {
            errors.add("quantity", "Quantity is required");
        }
        if self.warehouse_id.is_none() {
            errors.add("warehouseId", "Warehouse ID is required");
        }

        let new = NewInventoryItem {
            sku: self.sku.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            category: self.category,
            quantity: self.quantity.unwrap_or(0),
            storage_location: self.storage_location,
            warehouse_id: WarehouseId(self.warehouse_id.unwrap_or_default()),
        };
        if let Err(invalid) = new.validate() {
            errors.merge(invalid);
        }

        errors.into_result().map(|_| new)
    }
}

/// Body for `POST /api/items/transfer`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    pub item_id: Option<Uuid>,
    pub source_warehouse_id: Option<Uuid>,
    pub destination_warehouse_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

impl TransferBody {
    fn into_request(self) -> Result<TransferRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = [
            ("itemId", self.item_id.is_none(), "Item ID is required"),
            (
                "sourceWarehouseId",
                self.source_warehouse_id.is_none(),
                "Source warehouse ID is required",
            ),
            (
                "destinationWarehouseId",
                self.destination_warehouse_id.is_none(),
                "Destination warehouse ID is required",
            ),
            ("quantity", self.quantity.is_none(), "Quantity is required"),
        ];
        for (field, missing, message) in fields {
            if missing {
                errors.add(field, message);
            }
        }

        match (
            self.item_id,
            self.source_warehouse_id,
            self.destination_warehouse_id,
            self.quantity,
        ) {
            (Some(item), Some(source), Some(destination), Some(quantity)) => Ok(TransferRequest {
                item_id: ItemId(item),
                source_warehouse_id: WarehouseId(source),
                destination_warehouse_id: WarehouseId(destination),
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemsQuery {
    pub search_term: Option<String>,
    pub warehouse_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub storage_location: Option<String>,
    pub warehouse_id: String,
    pub warehouse_name: Option<String>,
    pub created_at: String,
}

impl From<ItemView> for ItemResponse {
    fn from(view: ItemView) -> Self {
        let item = view.item;
        ItemResponse {
            id: item.id.to_string(),
            sku: item.sku,
            name: item.name,
            description: item.description,
            category: item.category,
            quantity: item.quantity,
            storage_location: item.storage_location,
            warehouse_id: item.warehouse_id.to_string(),
            warehouse_name: view.warehouse_name,
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

fn responses(views: Vec<ItemView>) -> Json<Vec<ItemResponse>> {
    Json(views.into_iter().map(Into::into).collect())
}

/// GET /api/items
pub async fn list_items<S: InventoryStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    Ok(responses(state.inventory_service.list().await?))
}

/// GET /api/items/:id
pub async fn get_item<S: InventoryStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ItemResponse>, AppError> {
    let id = ItemId(path_param(id)?);
    let item = state.inventory_service.get(&id).await?;
    Ok(Json(item.into()))
}

/// GET /api/items/warehouse/:warehouse_id
pub async fn list_items_by_warehouse<S: InventoryStore>(
    State(state): State<AppState<S>>,
    warehouse_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let warehouse_id = WarehouseId(path_param(warehouse_id)?);
    let items = state
        .inventory_service
        .list_by_warehouse(&warehouse_id)
        .await?;
    Ok(responses(items))
}

/// GET /api/items/search?searchTerm=&warehouseId=
///
/// Both parameters are optional; with neither, every item is returned.
pub async fn search_items<S: InventoryStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<SearchItemsQuery>, QueryRejection>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let query = query_params(query)?;
    let items = state
        .inventory_service
        .search(
            query.search_term.as_deref(),
            query.warehouse_id.map(WarehouseId),
        )
        .await?;
    Ok(responses(items))
}

/// GET /api/items/categories
pub async fn list_categories<S: InventoryStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.inventory_service.categories().await?))
}

/// POST /api/items
pub async fn create_item<S: InventoryStore>(
    State(state): State<AppState<S>>,
    request: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemResponse>), AppError> {
    let new = json_body(request)?.into_new_item()?;
    let item = state.inventory_service.create(&new).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT /api/items/:id
pub async fn update_item<S: InventoryStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<Uuid>, PathRejection>,
    request: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<ItemResponse>, AppError> {
    let id = ItemId(path_param(id)?);
    let changes = json_body(request)?.into_new_item()?;
    let item = state
        .inventory_service
        .update(&id, &changes)
        .await?;
    Ok(Json(item.into()))
}

/// DELETE /api/items/:id
pub async fn delete_item<S: InventoryStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = ItemId(path_param(id)?);
    state.inventory_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/items/transfer
///
/// Returns the destination row: the moved item itself for a full transfer,
/// otherwise the merged or newly created row.
pub async fn transfer_item<S: InventoryStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<TransferBody>, JsonRejection>,
) -> Result<Json<ItemResponse>, AppError> {
    let request = json_body(body)?.into_request()?;
    let item = state.transfer_service.transfer(&request).await?;
    Ok(Json(item.into()))
}
