//! One-shot recompute for operators: fixture in, report out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use rackview_cache::{CacheConfig, CachedAggregateClient, StoreReader};
use rackview_core::WarehouseId;
use rackview_infra::fixture::InputFixture;
use rackview_infra::{
    AggregateStore, InMemoryAggregateStore, JsonFileAggregateStore, ReconcileConfig, Reconciler,
};
use rackview_reconcile::{ReconcileDiagnostics, ZoneAggregate};

pub const FIXTURE_ENV: &str = "RACKVIEW_FIXTURE";

#[derive(Debug, Serialize)]
pub struct RecomputeReport {
    pub diagnostics: ReconcileDiagnostics,
    /// Zone rollups of every warehouse in the fixture, in layout order.
    pub zones: Vec<ZoneAggregate>,
}

/// Fixture path from the first argument, else from `RACKVIEW_FIXTURE`.
pub fn fixture_path(arg: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    arg.or_else(|| std::env::var_os(FIXTURE_ENV).map(PathBuf::from))
        .with_context(|| format!("usage: rackview-recompute <fixture.json> (or set {FIXTURE_ENV})"))
}

pub fn open_store(config: &ReconcileConfig) -> anyhow::Result<Arc<dyn AggregateStore>> {
    match &config.snapshot_path {
        Some(path) => {
            let store = JsonFileAggregateStore::open(path)
                .with_context(|| format!("failed to open snapshot store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("RACKVIEW_SNAPSHOT_PATH not set; snapshot kept in memory only");
            Ok(Arc::new(InMemoryAggregateStore::new()))
        }
    }
}

pub async fn run(fixture_path: &Path, config: &ReconcileConfig) -> anyhow::Result<RecomputeReport> {
    let fixture = InputFixture::load(fixture_path)
        .with_context(|| format!("failed to load fixture {}", fixture_path.display()))?;
    let store = open_store(config)?;
    recompute(fixture, store, config).await
}

pub async fn recompute(
    fixture: InputFixture,
    store: Arc<dyn AggregateStore>,
    config: &ReconcileConfig,
) -> anyhow::Result<RecomputeReport> {
    let warehouses: Vec<WarehouseId> = fixture.layout.warehouses.iter().map(|w| w.id).collect();

    let reconciler = Reconciler::from_inputs(Arc::new(fixture.into_inputs()), store.clone());
    let diagnostics = reconciler.recompute_all().context("recompute failed")?;

    if diagnostics.has_configuration_issues() {
        tracing::error!(
            conflicting_keys = ?diagnostics.conflicting_keys,
            rejected_bindings = diagnostics.rejected_bindings,
            "binding configuration needs attention"
        );
    }

    let client = CachedAggregateClient::new(Arc::new(StoreReader::new(store)), CacheConfig::from(config));
    let mut zones = Vec::new();
    for warehouse_id in warehouses {
        zones.extend(client.get_zone_aggregates(warehouse_id).await?);
    }

    Ok(RecomputeReport { diagnostics, zones })
}
