//! Layout cells and their capacity.

use serde::{Deserialize, Serialize};

use rackview_core::{CellId, Entity, ZoneId};

/// Kind of a layout cell, as seen by the location matcher.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellKind {
    /// One storage slot; feed locations must equal the cell location.
    Single,
    /// A rack of floors × sub-cells; feed locations carry `-<floor>-<cell>` suffixes.
    MultiCell,
}

/// How matched rows translate into `current_count`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    /// Every distinct matched row counts once.
    #[default]
    Count,
    /// The cell is either occupied (1) or empty (0).
    Presence,
}

/// Kind-specific shape and capacity attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CellShape {
    Single {
        /// Explicit capacity; `None` or `0` falls back to `rows × cols`.
        #[serde(default)]
        capacity: Option<u32>,
        #[serde(default)]
        rows: u32,
        #[serde(default)]
        cols: u32,
    },
    MultiCell {
        floors: u32,
        cells_per_floor: u32,
        /// Per-floor, per-sub-cell capacities. `None` entries are unset and
        /// count as 1; a missing grid means every sub-cell is unset.
        #[serde(default)]
        grid: Option<Vec<Vec<Option<u32>>>>,
    },
}

/// Evaluated capacity of a cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CapacityAssessment {
    pub total: u64,
    /// The grid disagreed with the declared shape; missing slots counted as 0.
    pub malformed: bool,
}

/// A user-placed storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutCell {
    pub id: CellId,
    pub zone_id: ZoneId,
    pub location: String,
    #[serde(flatten)]
    pub shape: CellShape,
    #[serde(default)]
    pub occupancy: Occupancy,
}

impl LayoutCell {
    pub fn single(id: CellId, zone_id: ZoneId, location: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            zone_id,
            location: location.into(),
            shape: CellShape::Single {
                capacity: Some(capacity),
                rows: 0,
                cols: 0,
            },
            occupancy: Occupancy::Count,
        }
    }

    pub fn multi_cell(
        id: CellId,
        zone_id: ZoneId,
        location: impl Into<String>,
        floors: u32,
        cells_per_floor: u32,
    ) -> Self {
        Self {
            id,
            zone_id,
            location: location.into(),
            shape: CellShape::MultiCell {
                floors,
                cells_per_floor,
                grid: None,
            },
            occupancy: Occupancy::Count,
        }
    }

    /// Attach a capacity grid (only meaningful for multi-cells).
    pub fn with_grid(mut self, new_grid: Vec<Vec<Option<u32>>>) -> Self {
        if let CellShape::MultiCell { grid, .. } = &mut self.shape {
            *grid = Some(new_grid);
        }
        self
    }

    pub fn with_occupancy(mut self, occupancy: Occupancy) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn kind(&self) -> CellKind {
        match self.shape {
            CellShape::Single { .. } => CellKind::Single,
            CellShape::MultiCell { .. } => CellKind::MultiCell,
        }
    }

    /// Total storage capacity of the cell.
    ///
    /// Never fails: ill-shaped grids degrade to capacity 0 for the slots that
    /// cannot be read and are flagged as malformed.
    pub fn capacity(&self) -> CapacityAssessment {
        match &self.shape {
            CellShape::Single { capacity, rows, cols } => {
                let total = match capacity {
                    Some(c) if *c > 0 => u64::from(*c),
                    _ => u64::from(*rows) * u64::from(*cols),
                };
                CapacityAssessment {
                    total,
                    malformed: false,
                }
            }
            CellShape::MultiCell {
                floors,
                cells_per_floor,
                grid,
            } => grid_capacity(*floors, *cells_per_floor, grid.as_deref()),
        }
    }
}

impl Entity for LayoutCell {
    type Id = CellId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn grid_capacity(floors: u32, per_floor: u32, grid: Option<&[Vec<Option<u32>>]>) -> CapacityAssessment {
    let Some(grid) = grid else {
        return CapacityAssessment {
            total: u64::from(floors) * u64::from(per_floor),
            malformed: false,
        };
    };

    let floors = floors as usize;
    let per_floor = per_floor as usize;
    let mut malformed = grid.len() != floors;
    let mut total = 0u64;

    for floor in 0..floors {
        let Some(slots) = grid.get(floor) else {
            continue;
        };
        if slots.len() != per_floor {
            malformed = true;
        }
        for slot in slots.iter().take(per_floor) {
            total += u64::from(slot.unwrap_or(1));
        }
    }

    CapacityAssessment { total, malformed }
}
