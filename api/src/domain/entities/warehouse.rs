//! Warehouse domain entity
//!
//! A physical storage site with a fixed capacity. Capacity usage is never
//! stored on the warehouse; it is derived from the items it owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::capacity::WarehouseCapacity;
use crate::domain::validation::FieldErrors;

/// Unique identifier for a warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WarehouseId(pub Uuid);

impl WarehouseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WarehouseId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for WarehouseId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored warehouse record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub location: String,
    pub max_capacity: i32,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create a warehouse, or to replace an existing one's details
#[derive(Debug, Clone)]
pub struct NewWarehouse {
    pub name: String,
    pub location: String,
    pub max_capacity: i32,
}

impl NewWarehouse {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_text("name", &self.name, "Warehouse name is required");
        errors.require_text("location", &self.location, "Location is required");
        if self.max_capacity < 1 {
            errors.add("maxCapacity", "Maximum capacity must be at least 1");
        }
        errors.into_result()
    }
}

/// A warehouse together with its capacity figures, computed at read time
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseSummary {
    pub warehouse: Warehouse,
    pub capacity: WarehouseCapacity,
}
