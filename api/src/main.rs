//! Inventory API Server
//!
//! Tracks warehouses and the inventory items they hold, enforcing warehouse
//! capacity on every write and moving stock between warehouses atomically.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use sea_orm::Database;
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{ensure_schema, PostgresInventoryStore};
use app::{seed_sample_data, InventoryService, TransferService, WarehouseService};
use config::Config;
use domain::entities::SkuScope;
use domain::ports::InventoryStore;

/// Application state shared across all handlers
pub struct AppState<S: InventoryStore> {
    pub warehouse_service: Arc<WarehouseService<S>>,
    pub inventory_service: Arc<InventoryService<S>>,
    pub transfer_service: Arc<TransferService<S>>,
}

impl<S: InventoryStore> AppState<S> {
    pub fn new(store: Arc<S>, sku_scope: SkuScope) -> Self {
        Self {
            warehouse_service: Arc::new(WarehouseService::new(store.clone())),
            inventory_service: Arc::new(InventoryService::new(store.clone(), sku_scope)),
            transfer_service: Arc::new(TransferService::new(store, sku_scope)),
        }
    }
}

impl<S: InventoryStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            warehouse_service: self.warehouse_service.clone(),
            inventory_service: self.inventory_service.clone(),
            transfer_service: self.transfer_service.clone(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the API router over any store
pub fn build_router<S: InventoryStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Warehouses
        .route(
            "/api/warehouses",
            get(handlers::list_warehouses::<S>).post(handlers::create_warehouse::<S>),
        )
        .route("/api/warehouses/search", get(handlers::search_warehouses::<S>))
        .route(
            "/api/warehouses/:id",
            get(handlers::get_warehouse::<S>)
                .put(handlers::update_warehouse::<S>)
                .delete(handlers::delete_warehouse::<S>),
        )
        // Items
        .route(
            "/api/items",
            get(handlers::list_items::<S>).post(handlers::create_item::<S>),
        )
        .route("/api/items/search", get(handlers::search_items::<S>))
        .route("/api/items/categories", get(handlers::list_categories::<S>))
        .route("/api/items/transfer", post(handlers::transfer_item::<S>))
        .route(
            "/api/items/warehouse/:warehouse_id",
            get(handlers::list_items_by_warehouse::<S>),
        )
        .route(
            "/api/items/:id",
            get(handlers::get_item::<S>)
                .put(handlers::update_item::<S>)
                .delete(handlers::delete_item::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser frontend.
///
/// A configured origin is matched exactly, except that a trailing `:*`
/// accepts any port (`http://localhost:*`). Matching origins may send
/// credentials; others get no CORS headers. Unset allows any origin.
fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().max_age(Duration::from_secs(3600));

    let Some(pattern) = allowed_origin else {
        return Ok(layer
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    };

    HeaderValue::from_str(pattern)
        .with_context(|| format!("Invalid CORS_ALLOWED_ORIGIN: {}", pattern))?;
    let pattern = pattern.to_string();

    Ok(layer
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin_matches(&pattern, origin)
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

fn origin_matches(pattern: &str, origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };

    match pattern.strip_suffix('*') {
        Some(prefix) => origin
            .strip_prefix(prefix)
            .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())),
        None => origin == pattern,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,inventory_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Inventory API...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(sku_scope = %config.sku_scope, "Configuration loaded");

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    if config.auto_migrate {
        ensure_schema(&db)
            .await
            .context("Failed to create database schema")?;
    }

    let store = Arc::new(PostgresInventoryStore::new(db));
    let state = AppState::new(store, config.sku_scope);

    if config.seed_sample_data {
        seed_sample_data(&state.warehouse_service, &state.inventory_service)
            .await
            .context("Failed to load sample data")?;
    }

    let app = build_router(state).layer(cors_layer(config.cors_allowed_origin.as_deref())?);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
