//! Rollup records produced by the aggregator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rackview_core::{CellId, WarehouseId, ZoneId};
use rackview_layout::CellKind;

use crate::diagnostics::ReconcileDiagnostics;

/// Utilization of a cell or zone.
///
/// A zero-capacity location is `NotTracked`, never `0%`: zero would read as
/// "empty but trackable".
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Utilization {
    /// Percentage of capacity in use; may exceed 100 when over-filled.
    Tracked(f64),
    NotTracked,
}

impl Utilization {
    pub fn compute(current_count: u64, capacity: u64) -> Self {
        if capacity == 0 {
            return Utilization::NotTracked;
        }
        Utilization::Tracked(current_count as f64 / capacity as f64 * 100.0)
    }

    pub fn percent(self) -> Option<f64> {
        match self {
            Utilization::Tracked(p) => Some(p),
            Utilization::NotTracked => None,
        }
    }
}

/// Counts shared by cell and zone rollups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Distinct feed rows that matched.
    pub matched_rows: u64,
    /// Occupancy used for utilization (row count or presence).
    pub current_count: u64,
    pub current_quantity: f64,
    pub distinct_items: u64,
    pub capacity: u64,
    pub utilization: Utilization,
    pub last_computed: DateTime<Utc>,
}

/// Rollup for one layout cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellAggregate {
    pub cell_id: CellId,
    pub zone_id: ZoneId,
    pub warehouse_id: WarehouseId,
    pub location: String,
    pub kind: CellKind,
    /// Capacity grid disagreed with the declared rack shape.
    #[serde(default)]
    pub malformed_capacity: bool,
    #[serde(flatten)]
    pub record: AggregateRecord,
}

/// Quantity held under one lot key within a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotShare {
    /// `None` groups rows without a lot.
    pub lot_key: Option<String>,
    pub quantity: f64,
    /// Share of the zone quantity, rounded to one decimal.
    pub percentage: f64,
}

/// Quantity held for one item code within a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSummary {
    pub item_code: String,
    pub total_quantity: f64,
    /// Distinct lot keys seen for the item, sorted; rows without a lot are omitted.
    pub lots: Vec<String>,
}

/// Side-panel detail for a zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneBreakdown {
    /// Sorted by quantity, largest first.
    pub lot_distribution: Vec<LotShare>,
    /// Sorted by quantity, largest first.
    pub materials: Vec<MaterialSummary>,
}

/// Rollup for one zone: the sum of its cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAggregate {
    pub zone_id: ZoneId,
    pub warehouse_id: WarehouseId,
    pub zone_code: String,
    #[serde(default)]
    pub zone_name: String,
    pub cell_count: u64,
    #[serde(flatten)]
    pub record: AggregateRecord,
    #[serde(default)]
    pub breakdown: ZoneBreakdown,
}

/// Everything one recompute run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub computed_at: DateTime<Utc>,
    pub cells: BTreeMap<CellId, CellAggregate>,
    pub zones: BTreeMap<ZoneId, ZoneAggregate>,
    pub diagnostics: ReconcileDiagnostics,
}

impl AggregateSnapshot {
    /// A snapshot with nothing in it, used before the first recompute.
    pub fn empty(computed_at: DateTime<Utc>) -> Self {
        Self {
            computed_at,
            cells: BTreeMap::new(),
            zones: BTreeMap::new(),
            diagnostics: ReconcileDiagnostics::default(),
        }
    }

    /// Zones of one warehouse, ordered by zone code.
    pub fn zones_of(&self, warehouse_id: WarehouseId) -> Vec<ZoneAggregate> {
        let mut zones: Vec<ZoneAggregate> = self
            .zones
            .values()
            .filter(|z| z.warehouse_id == warehouse_id)
            .cloned()
            .collect();
        zones.sort_by(|a, b| a.zone_code.cmp(&b.zone_code).then(a.zone_id.cmp(&b.zone_id)));
        zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_not_tracked() {
        assert_eq!(Utilization::compute(3, 0), Utilization::NotTracked);
        assert_eq!(Utilization::compute(0, 4), Utilization::Tracked(0.0));
        assert_eq!(Utilization::compute(2, 4).percent(), Some(50.0));
    }

    #[test]
    fn utilization_serializes_distinctly() {
        let tracked = serde_json::to_value(Utilization::Tracked(50.0)).unwrap();
        let untracked = serde_json::to_value(Utilization::NotTracked).unwrap();
        assert_eq!(tracked, serde_json::json!({ "tracked": 50.0 }));
        assert_eq!(untracked, serde_json::json!("not_tracked"));
    }
}
