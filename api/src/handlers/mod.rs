//! HTTP handlers
//!
//! Axum request handlers for the API endpoints. Handlers are generic over
//! the store so the same router runs against PostgreSQL or the in-memory
//! store used in tests.

pub mod items;
pub mod warehouses;

pub use items::{
    create_item, delete_item, get_item, list_categories, list_items, list_items_by_warehouse,
    search_items, transfer_item, update_item,
};
pub use warehouses::{
    create_warehouse, delete_warehouse, get_warehouse, list_warehouses, search_warehouses,
    update_warehouse,
};

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use crate::error::AppError;

/// Unwrap a JSON body, turning malformed input into a JSON 400 response
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Unwrap path parameters, turning unparseable ids into a JSON 400 response
pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Unwrap a query string, turning malformed parameters into a JSON 400 response
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
