//! Cached access to aggregate rollups.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use rackview_core::{CellId, WarehouseId, ZoneId};
use rackview_infra::AggregateStore;
use rackview_reconcile::{CellAggregate, ZoneAggregate};

use crate::cache::ClientCache;
use crate::config::CacheConfig;
use crate::error::CacheError;

#[derive(Debug, Clone, Error)]
#[error("aggregate read failed: {0}")]
pub struct ReaderError(pub String);

/// The read side of the aggregate store, as seen from a client.
#[async_trait]
pub trait AggregateReader: Send + Sync {
    async fn cell_aggregate(&self, cell_id: CellId) -> Result<Option<CellAggregate>, ReaderError>;

    async fn zone_aggregate(&self, zone_id: ZoneId) -> Result<Option<ZoneAggregate>, ReaderError>;

    async fn zone_aggregates(&self, warehouse_id: WarehouseId) -> Result<Vec<ZoneAggregate>, ReaderError>;
}

#[async_trait]
impl<R> AggregateReader for Arc<R>
where
    R: AggregateReader + ?Sized,
{
    async fn cell_aggregate(&self, cell_id: CellId) -> Result<Option<CellAggregate>, ReaderError> {
        (**self).cell_aggregate(cell_id).await
    }

    async fn zone_aggregate(&self, zone_id: ZoneId) -> Result<Option<ZoneAggregate>, ReaderError> {
        (**self).zone_aggregate(zone_id).await
    }

    async fn zone_aggregates(&self, warehouse_id: WarehouseId) -> Result<Vec<ZoneAggregate>, ReaderError> {
        (**self).zone_aggregates(warehouse_id).await
    }
}

/// Reads straight from an in-process [`AggregateStore`].
#[derive(Debug, Clone)]
pub struct StoreReader<S> {
    store: S,
}

impl<S: AggregateStore> StoreReader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: AggregateStore> AggregateReader for StoreReader<S> {
    async fn cell_aggregate(&self, cell_id: CellId) -> Result<Option<CellAggregate>, ReaderError> {
        Ok(self.store.read(&cell_id))
    }

    async fn zone_aggregate(&self, zone_id: ZoneId) -> Result<Option<ZoneAggregate>, ReaderError> {
        Ok(self.store.read_zone(&zone_id))
    }

    async fn zone_aggregates(&self, warehouse_id: WarehouseId) -> Result<Vec<ZoneAggregate>, ReaderError> {
        Ok(self.store.read_warehouse_zones(&warehouse_id))
    }
}

/// Aggregate reads through one cache per read shape.
///
/// "No rollup" answers are cached like any other value.
pub struct CachedAggregateClient<R> {
    reader: Arc<R>,
    cells: ClientCache<CellId, Option<CellAggregate>>,
    zones: ClientCache<ZoneId, Option<ZoneAggregate>>,
    warehouse_zones: ClientCache<WarehouseId, Vec<ZoneAggregate>>,
}

impl<R: AggregateReader + 'static> CachedAggregateClient<R> {
    pub fn new(reader: Arc<R>, config: CacheConfig) -> Self {
        Self {
            reader,
            cells: ClientCache::new(config),
            zones: ClientCache::new(config),
            warehouse_zones: ClientCache::new(config),
        }
    }

    pub async fn get_cell_aggregate(&self, cell_id: CellId) -> Result<Option<CellAggregate>, CacheError> {
        let reader = Arc::clone(&self.reader);
        self.cells
            .get(cell_id, move || async move { reader.cell_aggregate(cell_id).await })
            .await
    }

    pub async fn get_zone_aggregate(&self, zone_id: ZoneId) -> Result<Option<ZoneAggregate>, CacheError> {
        let reader = Arc::clone(&self.reader);
        self.zones
            .get(zone_id, move || async move { reader.zone_aggregate(zone_id).await })
            .await
    }

    pub async fn get_zone_aggregates(&self, warehouse_id: WarehouseId) -> Result<Vec<ZoneAggregate>, CacheError> {
        let reader = Arc::clone(&self.reader);
        self.warehouse_zones
            .get(warehouse_id, move || async move {
                reader.zone_aggregates(warehouse_id).await
            })
            .await
    }

    /// Forget everything; typically called after a recompute is stored.
    pub fn invalidate_all(&self) {
        self.cells.invalidate_all();
        self.zones.invalidate_all();
        self.warehouse_zones.invalidate_all();
    }

    pub fn invalidate_warehouse(&self, warehouse_id: &WarehouseId) {
        self.warehouse_zones.invalidate(warehouse_id);
    }
}
