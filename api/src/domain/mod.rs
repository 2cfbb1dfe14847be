//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Domain models representing warehouses and their stock
//! - `capacity`: Capacity arithmetic and transfer planning
//! - `validation`: Per-field validation error collection
//! - `ports`: Trait definitions for the transactional store

pub mod capacity;
pub mod entities;
pub mod ports;
pub mod validation;
