//! Recompute wiring: sources in, snapshot out.
//!
//! Runs are serialized. A run loads every input, rebuilds every rollup from
//! scratch and replaces the stored snapshot in one write. Any structural
//! failure (a source that cannot be read, a layout that does not validate, a
//! store that rejects the write) leaves the previous snapshot in place.

use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use chrono::Utc;
use thiserror::Error;

use rackview_core::{CellId, DomainError, WarehouseId, ZoneId};
use rackview_feed::BindingTable;
use rackview_layout::Layout;
use rackview_reconcile::{Aggregator, CellAggregate, ReconcileDiagnostics, ZoneAggregate};

use crate::sources::{BindingSource, LayoutSource, RowSource, SourceError};
use crate::store::{AggregateStore, StoreError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("input source failed: {0}")]
    Source(#[from] SourceError),

    #[error("layout rejected: {0}")]
    Layout(#[from] DomainError),

    #[error("snapshot store failed: {0}")]
    Store(#[from] StoreError),

    #[error("a recompute is already running")]
    AlreadyRunning,
}

pub struct Reconciler<S: AggregateStore> {
    layout: Arc<dyn LayoutSource>,
    bindings: Arc<dyn BindingSource>,
    rows: Arc<dyn RowSource>,
    store: S,
    run_lock: Mutex<()>,
}

impl<S: AggregateStore> Reconciler<S> {
    pub fn new(
        layout: Arc<dyn LayoutSource>,
        bindings: Arc<dyn BindingSource>,
        rows: Arc<dyn RowSource>,
        store: S,
    ) -> Self {
        Self {
            layout,
            bindings,
            rows,
            store,
            run_lock: Mutex::new(()),
        }
    }

    /// Convenience for a single object providing every input.
    pub fn from_inputs<I>(inputs: Arc<I>, store: S) -> Self
    where
        I: LayoutSource + BindingSource + RowSource + 'static,
    {
        Self::new(inputs.clone(), inputs.clone(), inputs, store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rebuild every rollup. Waits for an in-flight run to finish first.
    pub fn recompute_all(&self) -> Result<ReconcileDiagnostics, ReconcileError> {
        // The guarded unit carries no state; a panicked run leaves nothing to repair.
        let _guard = self.run_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.run()
    }

    /// Like [`recompute_all`](Self::recompute_all), but refuses to queue
    /// behind a run that is already in flight.
    pub fn try_recompute_all(&self) -> Result<ReconcileDiagnostics, ReconcileError> {
        let _guard = match self.run_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(ReconcileError::AlreadyRunning),
        };
        self.run()
    }

    fn run(&self) -> Result<ReconcileDiagnostics, ReconcileError> {
        let span = tracing::info_span!("recompute");
        let _enter = span.enter();

        let layout = Layout::new(self.layout.load_layout()?)?;
        let table = BindingTable::build(self.bindings.load_bindings()?, layout.warehouses());
        let rows = self.rows.load_rows()?;

        let snapshot = Aggregator::new(&layout, &table).run(&rows, Utc::now());
        let diagnostics = snapshot.diagnostics.clone();

        if let Err(e) = self.store.write_snapshot(snapshot) {
            tracing::error!(error = %e, "failed to store aggregate snapshot; previous snapshot kept");
            return Err(e.into());
        }

        tracing::info!(
            rows = rows.len(),
            resolved = diagnostics.resolved_rows,
            orphaned = diagnostics.orphaned_rows,
            conflicts = diagnostics.binding_conflicts,
            invalid_layout = diagnostics.invalid_layout_entries,
            "recompute stored"
        );
        Ok(diagnostics)
    }

    pub fn get_cell_aggregate(&self, cell_id: &CellId) -> Option<CellAggregate> {
        self.store.read(cell_id)
    }

    pub fn get_zone_aggregate(&self, zone_id: &ZoneId) -> Option<ZoneAggregate> {
        self.store.read_zone(zone_id)
    }

    pub fn get_zone_aggregates(&self, warehouse_id: &WarehouseId) -> Vec<ZoneAggregate> {
        self.store.read_warehouse_zones(warehouse_id)
    }
}
