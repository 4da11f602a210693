//! Validated, indexed snapshot of the warehouse layout.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use rackview_core::{CellId, DomainError, DomainResult, Entity, WarehouseId, ZoneId};

use crate::cell::LayoutCell;
use crate::warehouse::Warehouse;
use crate::zone::{Zone, ZoneKey};

/// Raw layout records as delivered by the layout/admin collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutParts {
    #[serde(default)]
    pub warehouses: Vec<Warehouse>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub cells: Vec<LayoutCell>,
}

/// Two or more zones of one warehouse whose codes normalize to the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCollision {
    pub warehouse_id: WarehouseId,
    pub key: ZoneKey,
    pub zones: Vec<ZoneId>,
}

/// A layout record that was skipped or flagged while indexing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayoutIssue {
    /// Kept; bindings address warehouses by id.
    BlankWarehouseCode(WarehouseId),
    /// Kept; names the later warehouse carrying an already used code.
    DuplicateWarehouseCode { code: String, warehouse_id: WarehouseId },
    /// Zone skipped.
    UnknownWarehouse { zone_id: ZoneId, warehouse_id: WarehouseId },
    /// Zone skipped.
    BlankZoneCode(ZoneId),
    /// Cell skipped; also raised for cells of a skipped zone.
    UnknownZone { cell_id: CellId, zone_id: ZoneId },
}

/// Read-only layout snapshot.
///
/// Construction fails only on duplicate identities, which make every lookup
/// ambiguous. Dangling references and blank codes are skipped record by
/// record and listed in [`Layout::issues`], so one bad cell cannot take the
/// rest of the warehouse offline. Zone codes that collapse under
/// normalization are kept and reported through [`Layout::zone_collisions`]:
/// rows addressed to such a key are evaluated against the cells of every
/// colliding zone.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    warehouses: BTreeMap<WarehouseId, Warehouse>,
    zones: BTreeMap<ZoneId, Zone>,
    cells: BTreeMap<CellId, LayoutCell>,
    zones_by_key: HashMap<(WarehouseId, ZoneKey), Vec<ZoneId>>,
    cells_by_zone: HashMap<ZoneId, Vec<CellId>>,
    issues: Vec<LayoutIssue>,
}

impl Layout {
    pub fn new(parts: LayoutParts) -> DomainResult<Self> {
        ensure_unique_ids(&parts.warehouses, "warehouse")?;
        ensure_unique_ids(&parts.zones, "zone")?;
        ensure_unique_ids(&parts.cells, "cell")?;

        let mut layout = Layout::default();
        let mut codes = HashSet::new();

        for wh in parts.warehouses {
            let code = wh.code.trim().to_uppercase();
            if code.is_empty() {
                warn!(warehouse_id = %wh.id, "warehouse has an empty code");
                layout.issues.push(LayoutIssue::BlankWarehouseCode(wh.id));
            } else if !codes.insert(code.clone()) {
                warn!(warehouse_id = %wh.id, code = %code, "duplicate warehouse code");
                layout.issues.push(LayoutIssue::DuplicateWarehouseCode {
                    code,
                    warehouse_id: wh.id,
                });
            }
            layout.warehouses.insert(wh.id, wh);
        }

        for zone in parts.zones {
            if !layout.warehouses.contains_key(&zone.warehouse_id) {
                warn!(zone_id = %zone.id, warehouse_id = %zone.warehouse_id, "skipping zone of unknown warehouse");
                layout.issues.push(LayoutIssue::UnknownWarehouse {
                    zone_id: zone.id,
                    warehouse_id: zone.warehouse_id,
                });
                continue;
            }
            let key = zone.key();
            if key.is_blank() {
                warn!(zone_id = %zone.id, "skipping zone with an empty code");
                layout.issues.push(LayoutIssue::BlankZoneCode(zone.id));
                continue;
            }
            layout.zones_by_key.entry((zone.warehouse_id, key)).or_default().push(zone.id);
            layout.zones.insert(zone.id, zone);
        }

        for cell in parts.cells {
            if !layout.zones.contains_key(&cell.zone_id) {
                warn!(cell_id = %cell.id, zone_id = %cell.zone_id, "skipping cell of unknown zone");
                layout.issues.push(LayoutIssue::UnknownZone {
                    cell_id: cell.id,
                    zone_id: cell.zone_id,
                });
                continue;
            }
            layout.cells_by_zone.entry(cell.zone_id).or_default().push(cell.id);
            layout.cells.insert(cell.id, cell);
        }

        for ids in layout.zones_by_key.values_mut() {
            ids.sort();
        }
        for ids in layout.cells_by_zone.values_mut() {
            ids.sort();
        }
        layout.issues.sort();

        for collision in layout.zone_collisions() {
            warn!(
                warehouse_id = %collision.warehouse_id,
                zone_key = %collision.key,
                zones = collision.zones.len(),
                "zone codes collapse to the same normalized key"
            );
        }

        Ok(layout)
    }

    /// Records skipped or flagged during construction, sorted.
    pub fn issues(&self) -> &[LayoutIssue] {
        &self.issues
    }

    pub fn warehouse(&self, id: &WarehouseId) -> Option<&Warehouse> {
        self.warehouses.get(id)
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn cell(&self, id: &CellId) -> Option<&LayoutCell> {
        self.cells.get(id)
    }

    /// Warehouses ordered by id.
    pub fn warehouses(&self) -> impl Iterator<Item = &Warehouse> {
        self.warehouses.values()
    }

    /// Zones ordered by id.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Cells ordered by id.
    pub fn cells(&self) -> impl Iterator<Item = &LayoutCell> {
        self.cells.values()
    }

    /// Zones of a warehouse whose code normalizes to `key`.
    pub fn zones_for_key(&self, warehouse_id: WarehouseId, key: &ZoneKey) -> &[ZoneId] {
        self.zones_by_key
            .get(&(warehouse_id, key.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cells of a zone, ordered by id.
    pub fn cells_in_zone(&self, zone_id: &ZoneId) -> &[CellId] {
        self.cells_by_zone.get(zone_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn zone_collisions(&self) -> Vec<ZoneCollision> {
        let mut out: Vec<ZoneCollision> = self
            .zones_by_key
            .iter()
            .filter(|(_, zones)| zones.len() > 1)
            .map(|((warehouse_id, key), zones)| ZoneCollision {
                warehouse_id: *warehouse_id,
                key: key.clone(),
                zones: zones.clone(),
            })
            .collect();
        out.sort_by(|a, b| (a.warehouse_id, &a.key).cmp(&(b.warehouse_id, &b.key)));
        out
    }
}

fn ensure_unique_ids<E>(entities: &[E], what: &str) -> DomainResult<()>
where
    E: Entity,
    E::Id: core::fmt::Display,
{
    let mut seen = HashSet::new();
    for entity in entities {
        let id = entity.id();
        if !seen.insert(id) {
            return Err(DomainError::conflict(format!("duplicate {what} id {id}")));
        }
    }
    Ok(())
}
