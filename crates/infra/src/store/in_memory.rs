use std::sync::{Arc, PoisonError, RwLock};

use rackview_reconcile::AggregateSnapshot;

use super::{AggregateStore, StoreError};

/// In-memory snapshot store.
///
/// The snapshot lives behind an `Arc`; a write swaps the pointer under the
/// lock, so readers either get the previous snapshot or the new one.
#[derive(Debug, Default)]
pub struct InMemoryAggregateStore {
    current: RwLock<Option<Arc<AggregateSnapshot>>>,
}

impl InMemoryAggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: AggregateSnapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
        }
    }
}

impl AggregateStore for InMemoryAggregateStore {
    fn write_snapshot(&self, snapshot: AggregateSnapshot) -> Result<(), StoreError> {
        let snapshot = Arc::new(snapshot);
        // The guarded value is a single pointer; a panicked writer cannot leave it torn.
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(snapshot);
        Ok(())
    }

    fn snapshot(&self) -> Option<Arc<AggregateSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rackview_core::{CellId, WarehouseId, ZoneId};
    use rackview_layout::CellKind;
    use rackview_reconcile::{AggregateRecord, CellAggregate, Utilization, ZoneAggregate, ZoneBreakdown};

    fn record(count: u64) -> AggregateRecord {
        AggregateRecord {
            matched_rows: count,
            current_count: count,
            current_quantity: count as f64,
            distinct_items: 0,
            capacity: 4,
            utilization: Utilization::compute(count, 4),
            last_computed: Utc::now(),
        }
    }

    fn snapshot_with(cell: CellId, zone: ZoneId, warehouse: WarehouseId, count: u64) -> AggregateSnapshot {
        let mut snapshot = AggregateSnapshot::empty(Utc::now());
        snapshot.cells.insert(
            cell,
            CellAggregate {
                cell_id: cell,
                zone_id: zone,
                warehouse_id: warehouse,
                location: "A1".to_string(),
                kind: CellKind::MultiCell,
                malformed_capacity: false,
                record: record(count),
            },
        );
        snapshot.zones.insert(
            zone,
            ZoneAggregate {
                zone_id: zone,
                warehouse_id: warehouse,
                zone_code: "EA2-A".to_string(),
                zone_name: String::new(),
                cell_count: 1,
                record: record(count),
                breakdown: ZoneBreakdown::default(),
            },
        );
        snapshot
    }

    #[test]
    fn empty_store_reads_nothing() {
        let store = InMemoryAggregateStore::new();
        assert!(store.read(&CellId::new()).is_none());
        assert!(store.read_many(&[CellId::new()]).is_empty());
        assert!(store.last_computed().is_none());
        assert!(store.read_warehouse_zones(&WarehouseId::new()).is_empty());
    }

    #[test]
    fn write_replaces_whole_snapshot() {
        let (cell, zone, warehouse) = (CellId::new(), ZoneId::new(), WarehouseId::new());
        let store = InMemoryAggregateStore::new();

        store.write_snapshot(snapshot_with(cell, zone, warehouse, 1)).unwrap();
        assert_eq!(store.read(&cell).unwrap().record.current_count, 1);

        let other = CellId::new();
        store
            .write_snapshot(snapshot_with(other, ZoneId::new(), warehouse, 2))
            .unwrap();
        assert!(store.read(&cell).is_none());
        assert!(store.read_zone(&zone).is_none());
        assert_eq!(store.read(&other).unwrap().record.current_count, 2);
    }

    #[test]
    fn read_many_skips_unknown_cells() {
        let (cell, zone, warehouse) = (CellId::new(), ZoneId::new(), WarehouseId::new());
        let store = InMemoryAggregateStore::with_snapshot(snapshot_with(cell, zone, warehouse, 3));

        let found = store.read_many(&[cell, CellId::new()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[&cell].record.current_count, 3);
        assert_eq!(store.read_warehouse_zones(&warehouse).len(), 1);
    }

    #[test]
    fn readers_keep_their_snapshot_across_writes() {
        let (cell, zone, warehouse) = (CellId::new(), ZoneId::new(), WarehouseId::new());
        let store = Arc::new(InMemoryAggregateStore::with_snapshot(snapshot_with(cell, zone, warehouse, 1)));

        let held = store.snapshot().unwrap();
        store.write_snapshot(AggregateSnapshot::empty(Utc::now())).unwrap();

        assert_eq!(held.cells[&cell].record.current_count, 1);
        assert!(store.read(&cell).is_none());
    }

    #[test]
    fn poisoned_lock_still_serves_last_snapshot() {
        let (cell, zone, warehouse) = (CellId::new(), ZoneId::new(), WarehouseId::new());
        let store = Arc::new(InMemoryAggregateStore::with_snapshot(snapshot_with(cell, zone, warehouse, 4)));

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.current.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(store.current.is_poisoned());

        assert!(store.last_computed().is_some());
        assert_eq!(store.read(&cell).unwrap().record.current_count, 4);

        store.write_snapshot(AggregateSnapshot::empty(Utc::now())).unwrap();
        assert!(store.read(&cell).is_none());
    }
}
