//! `rackview-core`: shared building blocks for the reconciliation engine.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the domain error model and the `Entity` marker.

pub mod entity;
pub mod error;
pub mod feed_kind;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use feed_kind::FeedKind;
pub use id::{CellId, WarehouseId, ZoneId};
