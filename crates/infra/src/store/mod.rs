//! Aggregate snapshot storage.
//!
//! A store holds exactly one snapshot: the output of the last successful
//! recompute. Writes replace it wholesale; reads never trigger a recompute and
//! never observe a half-written snapshot.

pub mod in_memory;
pub mod json_file;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use rackview_core::{CellId, WarehouseId, ZoneId};
use rackview_reconcile::{AggregateSnapshot, CellAggregate, ReconcileDiagnostics, ZoneAggregate};

pub use in_memory::InMemoryAggregateStore;
pub use json_file::JsonFileAggregateStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io failed ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Snapshot-level storage for rollups.
///
/// Implementors only provide `write_snapshot` and `snapshot`; the point and
/// batch reads are derived from the current snapshot so that every read within
/// one call sees a single consistent snapshot.
pub trait AggregateStore: Send + Sync {
    /// Atomically replace the stored snapshot.
    fn write_snapshot(&self, snapshot: AggregateSnapshot) -> Result<(), StoreError>;

    /// Current snapshot, if a recompute has ever been stored.
    fn snapshot(&self) -> Option<Arc<AggregateSnapshot>>;

    fn read(&self, cell_id: &CellId) -> Option<CellAggregate> {
        self.snapshot()?.cells.get(cell_id).cloned()
    }

    /// Cells that have no rollup are absent from the result.
    fn read_many(&self, cell_ids: &[CellId]) -> HashMap<CellId, CellAggregate> {
        let Some(snapshot) = self.snapshot() else {
            return HashMap::new();
        };
        cell_ids
            .iter()
            .filter_map(|id| snapshot.cells.get(id).map(|agg| (*id, agg.clone())))
            .collect()
    }

    fn read_zone(&self, zone_id: &ZoneId) -> Option<ZoneAggregate> {
        self.snapshot()?.zones.get(zone_id).cloned()
    }

    /// Zone rollups of one warehouse, ordered by zone code.
    fn read_warehouse_zones(&self, warehouse_id: &WarehouseId) -> Vec<ZoneAggregate> {
        self.snapshot()
            .map(|s| s.zones_of(*warehouse_id))
            .unwrap_or_default()
    }

    /// When the stored snapshot was computed; consumers use this to judge staleness.
    fn last_computed(&self) -> Option<DateTime<Utc>> {
        self.snapshot().map(|s| s.computed_at)
    }

    fn diagnostics(&self) -> Option<ReconcileDiagnostics> {
        self.snapshot().map(|s| s.diagnostics.clone())
    }
}

impl<S> AggregateStore for Arc<S>
where
    S: AggregateStore + ?Sized,
{
    fn write_snapshot(&self, snapshot: AggregateSnapshot) -> Result<(), StoreError> {
        (**self).write_snapshot(snapshot)
    }

    fn snapshot(&self) -> Option<Arc<AggregateSnapshot>> {
        (**self).snapshot()
    }
}
