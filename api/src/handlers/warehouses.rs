//! Warehouse handlers
//!
//! Endpoints for warehouse management. Capacity figures in every response
//! are computed from the warehouse's items at request time.

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

use crate::domain::entities::{NewWarehouse, WarehouseId, WarehouseSummary};
use crate::domain::ports::InventoryStore;
use crate::domain::validation::FieldErrors;
use crate::error::AppError;
use crate::handlers::{json_body, path_param, query_params};
use crate::AppState;

/// Body for creating or replacing a warehouse
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub max_capacity: Option<i32>,
}

impl WarehouseRequest {
    fn into_new_warehouse(self) -> Result<NewWarehouse, FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.max_capacity.is_none() {
            errors.add("maxCapacity", "Maximum capacity is required");
        }

        let new = NewWarehouse {
            name: self.name.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            max_capacity: self.max_capacity.unwrap_or(0),
        };
        if let Err(invalid) = new.validate() {
            errors.merge(invalid);
        }

        errors.into_result().map(|_| new)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchWarehousesQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseResponse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub max_capacity: i32,
    pub current_capacity: i64,
    pub available_capacity: i64,
    pub utilization_percentage: f64,
    pub item_count: i64,
    pub created_at: String,
}

impl From<WarehouseSummary> for WarehouseResponse {
    fn from(summary: WarehouseSummary) -> Self {
        let WarehouseSummary {
            warehouse,
            capacity,
        } = summary;

        WarehouseResponse {
            id: warehouse.id.to_string(),
            name: warehouse.name,
            location: warehouse.location,
            max_capacity: warehouse.max_capacity,
            current_capacity: capacity.current,
            available_capacity: capacity.available(),
            utilization_percentage: capacity.utilization_percentage(),
            item_count: capacity.item_count,
            created_at: warehouse.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/warehouses
pub async fn list_warehouses<S: InventoryStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<WarehouseResponse>>, AppError> {
    let warehouses = state.warehouse_service.list().await?;
    Ok(Json(warehouses.into_iter().map(Into::into).collect()))
}

/// GET /api/warehouses/:id
pub async fn get_warehouse<S: InventoryStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<WarehouseResponse>, AppError> {
    let id = WarehouseId(path_param(id)?);
    let warehouse = state.warehouse_service.get(&id).await?;
    Ok(Json(warehouse.into()))
}

/// GET /api/warehouses/search?name=
///
/// Case-insensitive substring match on the name. An empty name lists all.
pub async fn search_warehouses<S: InventoryStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<SearchWarehousesQuery>, QueryRejection>,
) -> Result<Json<Vec<WarehouseResponse>>, AppError> {
    let query = query_params(query)?;
    let warehouses = state.warehouse_service.search(&query.name).await?;
    Ok(Json(warehouses.into_iter().map(Into::into).collect()))
}

/// POST /api/warehouses
pub async fn create_warehouse<S: InventoryStore>(
    State(state): State<AppState<S>>,
    request: Result<Json<WarehouseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WarehouseResponse>), AppError> {
    let new = json_body(request)?.into_new_warehouse()?;
    let warehouse = state.warehouse_service.create(&new).await?;
    Ok((StatusCode::CREATED, Json(warehouse.into())))
}

/// PUT /api/warehouses/:id
pub async fn update_warehouse<S: InventoryStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<Uuid>, PathRejection>,
    request: Result<Json<WarehouseRequest>, JsonRejection>,
) -> Result<Json<WarehouseResponse>, AppError> {
    let id = WarehouseId(path_param(id)?);
    let changes = json_body(request)?.into_new_warehouse()?;
    let warehouse = state
        .warehouse_service
        .update(&id, &changes)
        .await?;
    Ok(Json(warehouse.into()))
}

/// DELETE /api/warehouses/:id
///
/// Refused with 409 Conflict while the warehouse still owns items.
pub async fn delete_warehouse<S: InventoryStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = WarehouseId(path_param(id)?);
    state.warehouse_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
