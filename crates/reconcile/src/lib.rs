//! `rackview-reconcile`
//!
//! **Responsibility:** turn (layout, bindings, feed rows) into capacity and
//! stock rollups.
//!
//! This crate is pure and deterministic:
//! - no IO, no clocks (the caller passes `computed_at`)
//! - every run is a full rebuild; nothing is carried over between runs
//! - row-level problems never fail a run, they are counted in
//!   [`ReconcileDiagnostics`]

pub mod aggregator;
pub mod diagnostics;
pub mod record;

pub use aggregator::Aggregator;
pub use diagnostics::ReconcileDiagnostics;
pub use record::{
    AggregateRecord, AggregateSnapshot, CellAggregate, LotShare, MaterialSummary, Utilization,
    ZoneAggregate, ZoneBreakdown,
};
