//! Inventory item domain entity
//!
//! A stock pile of one SKU held by exactly one warehouse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::warehouse::WarehouseId;
use crate::domain::validation::FieldErrors;

/// Longest description accepted for an item
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Unique identifier for an inventory item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How widely a SKU must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkuScope {
    /// A SKU may appear only once across all warehouses
    #[default]
    Global,
    /// A SKU may appear once in each warehouse
    Warehouse,
}

impl SkuScope {
    /// The warehouse a uniqueness lookup is restricted to, if any
    pub fn restrict_to(self, warehouse_id: &WarehouseId) -> Option<&WarehouseId> {
        match self {
            SkuScope::Global => None,
            SkuScope::Warehouse => Some(warehouse_id),
        }
    }
}

impl std::fmt::Display for SkuScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkuScope::Global => write!(f, "global"),
            SkuScope::Warehouse => write!(f, "warehouse"),
        }
    }
}

impl std::str::FromStr for SkuScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(SkuScope::Global),
            "warehouse" => Ok(SkuScope::Warehouse),
            _ => Err(format!("Unknown SKU scope: {}", s)),
        }
    }
}

/// A stored inventory item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub storage_location: Option<String>,
    pub warehouse_id: WarehouseId,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create an item, or to replace an existing one's details
#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub storage_location: Option<String>,
    pub warehouse_id: WarehouseId,
}

impl NewInventoryItem {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("sku", &self.sku, "SKU is required");
        errors.require_text("name", &self.name, "Item name is required");
        if self.quantity < 0 {
            errors.add("quantity", "Quantity cannot be negative");
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                errors.add(
                    "description",
                    format!(
                        "Description must be at most {} characters",
                        MAX_DESCRIPTION_LEN
                    ),
                );
            }
        }
        errors.into_result()
    }

    /// Copy of `source` holding `quantity` units under a different SKU in another warehouse
    pub fn split_from(
        source: &InventoryItem,
        sku: String,
        quantity: i32,
        warehouse_id: WarehouseId,
    ) -> Self {
        Self {
            sku,
            name: source.name.clone(),
            description: source.description.clone(),
            category: source.category.clone(),
            quantity,
            storage_location: source.storage_location.clone(),
            warehouse_id,
        }
    }
}

/// An item with its owning warehouse's name, as returned by reads
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub item: InventoryItem,
    pub warehouse_name: Option<String>,
}

/// Read-side item filter. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive substring of name, SKU or category
    pub term: Option<String>,
    pub warehouse_id: Option<WarehouseId>,
}

impl ItemFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_warehouse(warehouse_id: WarehouseId) -> Self {
        Self {
            term: None,
            warehouse_id: Some(warehouse_id),
        }
    }

    /// Build a search filter. A blank term means no text filter.
    pub fn search(term: Option<&str>, warehouse_id: Option<WarehouseId>) -> Self {
        let term = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self { term, warehouse_id }
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(warehouse_id) = &self.warehouse_id {
            if item.warehouse_id != *warehouse_id {
                return false;
            }
        }

        match &self.term {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                item.name.to_lowercase().contains(&needle)
                    || item.sku.to_lowercase().contains(&needle)
                    || item
                        .category
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
            }
        }
    }
}
