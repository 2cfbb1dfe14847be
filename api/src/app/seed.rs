//! Sample data for an empty database
//!
//! Goes through the services so every row passes the same validation and
//! capacity checks as API writes.

use crate::app::{InventoryService, WarehouseService};
use crate::domain::entities::{NewInventoryItem, NewWarehouse};
use crate::domain::ports::InventoryStore;
use crate::error::AppError;

const WAREHOUSES: &[(&str, &str, i32)] = &[
    ("Main Distribution Center", "New York, NY", 10000),
    ("West Coast Hub", "Los Angeles, CA", 8000),
    ("Midwest Warehouse", "Chicago, IL", 7500),
    ("Southern Distribution", "Atlanta, GA", 6000),
    ("Pacific Northwest", "Seattle, WA", 5500),
];

/// (sku, name, description, category, quantity, storage location, warehouse index)
type SampleItem = (&'static str, &'static str, &'static str, &'static str, i32, &'static str, usize);

const ITEMS: &[SampleItem] = &[
    ("LAPTOP-001", "Dell Latitude 5520", "15-inch business laptop", "Electronics", 150, "A1-R1-S3", 0),
    ("LAPTOP-002", "MacBook Pro 16", "Professional laptop", "Electronics", 85, "A1-R2-S1", 1),
    ("LAPTOP-003", "HP EliteBook 840", "Lightweight laptop", "Electronics", 120, "A2-R1-S2", 2),
    ("DESK-CHAIR-001", "ErgoMax Executive Chair", "Ergonomic office chair", "Furniture", 200, "B1-R3-S1", 0),
    ("DESK-001", "Standing Desk Pro", "Adjustable height desk", "Furniture", 75, "B2-R1-S2", 1),
    ("DESK-002", "Corner Desk Unit", "L-shaped desk", "Furniture", 60, "B1-R2-S3", 3),
    ("MONITOR-001", "Dell UltraSharp 27", "27-inch 4K monitor", "Electronics", 180, "A3-R1-S1", 0),
    ("MONITOR-002", "LG 34 Ultrawide", "34-inch curved monitor", "Electronics", 95, "A1-R3-S2", 2),
    ("KEYBOARD-001", "Mechanical Keyboard RGB", "Gaming keyboard", "Electronics", 300, "A2-R2-S1", 1),
    ("MOUSE-001", "Wireless Ergonomic Mouse", "Vertical mouse", "Electronics", 250, "A2-R2-S2", 1),
    ("PRINTER-001", "HP LaserJet Pro", "Network printer", "Electronics", 45, "C1-R1-S1", 0),
    ("PRINTER-002", "Canon ImageClass", "Color laser printer", "Electronics", 30, "C1-R2-S1", 3),
    ("PHONE-001", "VoIP Desk Phone", "Business phone", "Electronics", 400, "A3-R2-S1", 0),
    ("TABLET-001", "iPad Pro 12.9", "Professional tablet", "Electronics", 120, "A1-R1-S1", 1),
    ("CABLE-001", "USB-C Cable 6ft", "Charging cable", "Accessories", 1000, "D1-R1-S1", 4),
    ("ADAPTER-001", "USB-C Hub", "Multi-port adapter", "Accessories", 500, "D1-R1-S2", 4),
    ("WHITEBOARD-001", "Mobile Whiteboard", "Rolling whiteboard", "Office Supplies", 35, "B3-R1-S1", 2),
    ("FILING-001", "4-Drawer File Cabinet", "Locking file cabinet", "Furniture", 80, "B2-R3-S1", 3),
    ("LAMP-001", "LED Desk Lamp", "Adjustable desk lamp", "Office Supplies", 150, "D2-R1-S1", 0),
    ("WEBCAM-001", "HD Webcam 1080p", "Conference camera", "Electronics", 200, "A3-R3-S1", 2),
    ("HEADSET-001", "Noise-Canceling Headset", "Wireless headset", "Electronics", 175, "A2-R3-S1", 1),
];

/// Load the sample warehouses and items unless a warehouse already exists.
///
/// Returns whether anything was written.
pub async fn seed_sample_data<S: InventoryStore>(
    warehouses: &WarehouseService<S>,
    items: &InventoryService<S>,
) -> Result<bool, AppError> {
    if !warehouses.is_empty().await? {
        tracing::info!("Database already contains data, skipping sample data");
        return Ok(false);
    }

    tracing::info!("Loading sample data");

    let mut ids = Vec::with_capacity(WAREHOUSES.len());
    for (name, location, max_capacity) in WAREHOUSES {
        let created = warehouses
            .create(&NewWarehouse {
                name: name.to_string(),
                location: location.to_string(),
                max_capacity: *max_capacity,
            })
            .await?;
        ids.push(created.warehouse.id);
    }

    for (sku, name, description, category, quantity, location, warehouse) in ITEMS {
        items
            .create(&NewInventoryItem {
                sku: sku.to_string(),
                name: name.to_string(),
                description: Some(description.to_string()),
                category: Some(category.to_string()),
                quantity: *quantity,
                storage_location: Some(location.to_string()),
                warehouse_id: ids[*warehouse],
            })
            .await?;
    }

    tracing::info!(
        warehouses = WAREHOUSES.len(),
        items = ITEMS.len(),
        "Sample data loaded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SkuScope;
    use crate::test_utils::InMemoryInventoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeds_an_empty_store_once() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let warehouses = WarehouseService::new(store.clone());
        let items = InventoryService::new(store.clone(), SkuScope::Global);

        assert!(seed_sample_data(&warehouses, &items).await.unwrap());
        assert!(!seed_sample_data(&warehouses, &items).await.unwrap());

        assert_eq!(warehouses.list().await.unwrap().len(), 5);
        assert_eq!(store.item_count(), ITEMS.len());
        assert_eq!(
            items.categories().await.unwrap(),
            vec!["Accessories", "Electronics", "Furniture", "Office Supplies"]
        );
    }

    #[tokio::test]
    async fn seeded_warehouses_report_usage() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let warehouses = WarehouseService::new(store.clone());
        let items = InventoryService::new(store, SkuScope::Global);
        seed_sample_data(&warehouses, &items).await.unwrap();

        let seattle = warehouses.search("pacific").await.unwrap();

        assert_eq!(seattle.len(), 1);
        assert_eq!(seattle[0].capacity.current, 1500);
        assert_eq!(seattle[0].capacity.item_count, 2);
    }
}
