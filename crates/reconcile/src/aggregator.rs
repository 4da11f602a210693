//! Full-rebuild reconciliation of feed rows against the layout.
//!
//! Model:
//! - Resolve every row's binding key to one warehouse (or drop it).
//! - Pick the zone: the row's own zone when present, else the binding's.
//! - Evaluate every cell of that zone; a row counts toward every cell it
//!   matches, ambiguous layouts included.
//! - Zone rollups add up their cells; rows are never re-matched at zone level.
//!
//! Rows are put into a canonical order before anything is summed, so the
//! output does not depend on input order (floating-point sums included).

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use rackview_core::{CellId, ZoneId};
use rackview_feed::{BindingTable, RawInventoryRow, Resolution};
use rackview_layout::{location_key, Layout, LayoutCell, LocationPattern, Occupancy, ZoneKey};

use crate::diagnostics::ReconcileDiagnostics;
use crate::record::{
    AggregateRecord, AggregateSnapshot, CellAggregate, LotShare, MaterialSummary, Utilization,
    ZoneAggregate, ZoneBreakdown,
};

/// Rollup engine over one layout and binding table.
#[derive(Debug)]
pub struct Aggregator<'a> {
    layout: &'a Layout,
    bindings: &'a BindingTable,
    patterns: HashMap<CellId, LocationPattern>,
}

/// Running totals for one cell.
#[derive(Debug, Default)]
struct CellTally {
    rows: u64,
    quantity: f64,
    items: BTreeSet<String>,
    lots: BTreeMap<Option<String>, f64>,
    materials: BTreeMap<String, (f64, BTreeSet<String>)>,
}

impl CellTally {
    fn add(&mut self, row: &RawInventoryRow) {
        let qty = row.quantity();
        self.rows += 1;
        self.quantity += qty;
        *self.lots.entry(non_blank(row.lot_key.as_deref())).or_insert(0.0) += qty;

        let item = row.item_code.trim();
        if item.is_empty() {
            return;
        }
        self.items.insert(item.to_string());
        let (total, lots) = self.materials.entry(item.to_string()).or_default();
        *total += qty;
        if let Some(lot) = non_blank(row.lot_key.as_deref()) {
            lots.insert(lot);
        }
    }
}

impl<'a> Aggregator<'a> {
    pub fn new(layout: &'a Layout, bindings: &'a BindingTable) -> Self {
        let patterns = layout
            .cells()
            .filter_map(|cell| LocationPattern::for_cell(cell).map(|p| (cell.id, p)))
            .collect();
        Self {
            layout,
            bindings,
            patterns,
        }
    }

    /// Rebuild every cell and zone rollup from `rows`.
    pub fn run(&self, rows: &[RawInventoryRow], computed_at: DateTime<Utc>) -> AggregateSnapshot {
        let mut diag = ReconcileDiagnostics {
            rejected_bindings: self.bindings.report().rejected.len() as u64,
            invalid_layout_entries: self.layout.issues().len() as u64,
            conflicting_keys: self
                .bindings
                .report()
                .conflicts
                .iter()
                .map(|c| c.key.clone())
                .collect(),
            ..ReconcileDiagnostics::default()
        };
        diag.conflicting_keys.sort();

        let rows = canonical_rows(rows, &mut diag);
        let mut tallies: HashMap<CellId, CellTally> = HashMap::new();

        for row in rows {
            let target = match self.bindings.resolve(row) {
                Resolution::Bound(target) => target,
                Resolution::Orphaned => {
                    diag.orphaned_rows += 1;
                    continue;
                }
                Resolution::Conflict(_) => {
                    diag.binding_conflicts += 1;
                    continue;
                }
            };
            diag.resolved_rows += 1;
            if row.has_invalid_quantity() {
                diag.invalid_quantity_rows += 1;
            }

            let mut zone_key = ZoneKey::new(&row.zone);
            if zone_key.is_blank() {
                zone_key = ZoneKey::new(&target.zone_value);
            }
            let zones = self.layout.zones_for_key(target.warehouse_id, &zone_key);
            if zones.is_empty() {
                diag.unknown_zone_rows += 1;
                continue;
            }

            let loc = location_key(&row.location);
            if loc.is_empty() {
                diag.blank_location_rows += 1;
                continue;
            }

            let mut matched = 0u32;
            for zone_id in zones {
                for cell_id in self.layout.cells_in_zone(zone_id) {
                    let hit = self.patterns.get(cell_id).is_some_and(|p| p.matches_key(&loc));
                    if hit {
                        tallies.entry(*cell_id).or_default().add(row);
                        matched += 1;
                    }
                }
            }

            match matched {
                0 => diag.unmatched_rows += 1,
                1 => {}
                n => {
                    debug!(row_id = %row.row_id, location = %row.location, cells = n, "row matched several cells");
                    diag.multi_matched_rows += 1;
                }
            }
        }

        let cells = self.cell_aggregates(&tallies, computed_at, &mut diag);
        let zones = self.zone_aggregates(&cells, &tallies, computed_at);

        if diag.invalid_quantity_rows > 0 {
            warn!(invalid_quantity_rows = diag.invalid_quantity_rows, "rows with non-finite quantity counted as 0");
        }
        if diag.orphaned_rows > 0 {
            warn!(orphaned_rows = diag.orphaned_rows, "rows with no bound warehouse were excluded");
        }
        info!(
            resolved_rows = diag.resolved_rows,
            orphaned_rows = diag.orphaned_rows,
            binding_conflicts = diag.binding_conflicts,
            unmatched_rows = diag.unmatched_rows,
            cells = cells.len(),
            zones = zones.len(),
            "aggregation complete"
        );

        AggregateSnapshot {
            computed_at,
            cells,
            zones,
            diagnostics: diag,
        }
    }

    fn cell_aggregates(
        &self,
        tallies: &HashMap<CellId, CellTally>,
        computed_at: DateTime<Utc>,
        diag: &mut ReconcileDiagnostics,
    ) -> BTreeMap<CellId, CellAggregate> {
        let mut out = BTreeMap::new();

        for cell in self.layout.cells() {
            let Some(zone) = self.layout.zone(&cell.zone_id) else {
                continue;
            };
            let capacity = cell.capacity();
            if capacity.malformed {
                warn!(cell_id = %cell.id, location = %cell.location, "malformed capacity grid; missing slots count as 0");
                diag.malformed_capacity_cells += 1;
            }
            if capacity.total == 0 {
                diag.cells_with_zero_capacity += 1;
            }

            let tally = tallies.get(&cell.id);
            let matched_rows = tally.map_or(0, |t| t.rows);
            let current_count = occupancy_count(cell, matched_rows);

            out.insert(
                cell.id,
                CellAggregate {
                    cell_id: cell.id,
                    zone_id: zone.id,
                    warehouse_id: zone.warehouse_id,
                    location: cell.location.clone(),
                    kind: cell.kind(),
                    malformed_capacity: capacity.malformed,
                    record: AggregateRecord {
                        matched_rows,
                        current_count,
                        current_quantity: tally.map_or(0.0, |t| t.quantity),
                        distinct_items: tally.map_or(0, |t| t.items.len() as u64),
                        capacity: capacity.total,
                        utilization: Utilization::compute(current_count, capacity.total),
                        last_computed: computed_at,
                    },
                },
            );
        }

        out
    }

    fn zone_aggregates(
        &self,
        cells: &BTreeMap<CellId, CellAggregate>,
        tallies: &HashMap<CellId, CellTally>,
        computed_at: DateTime<Utc>,
    ) -> BTreeMap<ZoneId, ZoneAggregate> {
        let mut out = BTreeMap::new();

        for zone in self.layout.zones() {
            let mut matched_rows = 0u64;
            let mut current_count = 0u64;
            let mut quantity = 0.0f64;
            let mut capacity = 0u64;
            let mut items: HashSet<&str> = HashSet::new();
            let mut lots: BTreeMap<Option<String>, f64> = BTreeMap::new();
            let mut materials: BTreeMap<String, (f64, BTreeSet<String>)> = BTreeMap::new();

            let cell_ids = self.layout.cells_in_zone(&zone.id);
            for cell_id in cell_ids {
                let Some(cell) = cells.get(cell_id) else {
                    continue;
                };
                matched_rows += cell.record.matched_rows;
                current_count += cell.record.current_count;
                quantity += cell.record.current_quantity;
                capacity += cell.record.capacity;

                let Some(tally) = tallies.get(cell_id) else {
                    continue;
                };
                items.extend(tally.items.iter().map(String::as_str));
                for (lot, qty) in &tally.lots {
                    *lots.entry(lot.clone()).or_insert(0.0) += qty;
                }
                for (item, (qty, item_lots)) in &tally.materials {
                    let entry = materials.entry(item.clone()).or_default();
                    entry.0 += qty;
                    entry.1.extend(item_lots.iter().cloned());
                }
            }

            out.insert(
                zone.id,
                ZoneAggregate {
                    zone_id: zone.id,
                    warehouse_id: zone.warehouse_id,
                    zone_code: zone.code.clone(),
                    zone_name: zone.name.clone(),
                    cell_count: cell_ids.len() as u64,
                    record: AggregateRecord {
                        matched_rows,
                        current_count,
                        current_quantity: quantity,
                        distinct_items: items.len() as u64,
                        capacity,
                        utilization: Utilization::compute(current_count, capacity),
                        last_computed: computed_at,
                    },
                    breakdown: breakdown(quantity, lots, materials),
                },
            );
        }

        out
    }
}

fn occupancy_count(cell: &LayoutCell, matched_rows: u64) -> u64 {
    match cell.occupancy {
        Occupancy::Count => matched_rows,
        Occupancy::Presence => u64::from(matched_rows > 0),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn breakdown(
    zone_quantity: f64,
    lots: BTreeMap<Option<String>, f64>,
    materials: BTreeMap<String, (f64, BTreeSet<String>)>,
) -> ZoneBreakdown {
    let mut lot_distribution: Vec<LotShare> = lots
        .into_iter()
        .map(|(lot_key, quantity)| LotShare {
            lot_key,
            quantity,
            percentage: if zone_quantity != 0.0 {
                (quantity / zone_quantity * 1000.0).round() / 10.0
            } else {
                0.0
            },
        })
        .collect();
    lot_distribution.sort_by(|a, b| b.quantity.total_cmp(&a.quantity).then_with(|| a.lot_key.cmp(&b.lot_key)));

    let mut materials: Vec<MaterialSummary> = materials
        .into_iter()
        .map(|(item_code, (total_quantity, lots))| MaterialSummary {
            item_code,
            total_quantity,
            lots: lots.into_iter().collect(),
        })
        .collect();
    materials.sort_by(|a, b| {
        b.total_quantity
            .total_cmp(&a.total_quantity)
            .then_with(|| a.item_code.cmp(&b.item_code))
    });

    ZoneBreakdown {
        lot_distribution,
        materials,
    }
}

/// Sort rows into a canonical order and drop repeated `(source_id, row_id)` pairs.
fn canonical_rows<'r>(rows: &'r [RawInventoryRow], diag: &mut ReconcileDiagnostics) -> Vec<&'r RawInventoryRow> {
    let mut sorted: Vec<&RawInventoryRow> = rows.iter().collect();
    sorted.sort_by(|a, b| canonical_cmp(a, b));

    let before = sorted.len();
    sorted.dedup_by(|later, earlier| later.source_id == earlier.source_id && later.row_id == earlier.row_id);
    diag.duplicate_rows = (before - sorted.len()) as u64;
    sorted
}

fn canonical_cmp(a: &RawInventoryRow, b: &RawInventoryRow) -> Ordering {
    a.source_id
        .cmp(&b.source_id)
        .then_with(|| a.row_id.cmp(&b.row_id))
        .then_with(|| a.partition_key.cmp(&b.partition_key))
        .then_with(|| a.zone.cmp(&b.zone))
        .then_with(|| a.location.cmp(&b.location))
        .then_with(|| a.item_code.cmp(&b.item_code))
        .then_with(|| a.lot_key.cmp(&b.lot_key))
        .then_with(|| cmp_qty(a.available_qty, b.available_qty))
        .then_with(|| cmp_qty(a.total_qty, b.total_qty))
}

fn cmp_qty(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.is_some().cmp(&b.is_some()),
    }
}
