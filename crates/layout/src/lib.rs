//! Spatial warehouse layout (read-only view).
//!
//! Warehouses, zones and cells are authored by the layout editor and the admin
//! workflow; this crate only models them, validates a snapshot of them, and
//! hosts the two pure comparison rules the engine needs:
//!
//! - [`zone::normalize_zone`]: canonical zone keys
//! - [`location::LocationPattern`]: feed location → cell matching

pub mod cell;
pub mod layout;
pub mod location;
pub mod warehouse;
pub mod zone;

pub use cell::{CapacityAssessment, CellKind, CellShape, LayoutCell, Occupancy};
pub use layout::{Layout, LayoutIssue, LayoutParts, ZoneCollision};
pub use location::{location_key, matches, LocationPattern};
pub use warehouse::Warehouse;
pub use zone::{normalize_zone, Zone, ZoneKey};
