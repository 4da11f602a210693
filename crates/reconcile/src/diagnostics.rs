use serde::{Deserialize, Serialize};

use rackview_feed::BindingKey;

/// Summary of one recompute run.
///
/// The first four counters are the contract of `recompute_all()`; the rest
/// explain where the remaining rows went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileDiagnostics {
    /// Rows whose binding key resolved to exactly one warehouse.
    pub resolved_rows: u64,
    /// Rows whose binding key no warehouse claims.
    pub orphaned_rows: u64,
    /// Rows excluded because their binding key is claimed more than once.
    pub binding_conflicts: u64,
    pub cells_with_zero_capacity: u64,

    /// Resolved rows whose zone exists but whose location matched no cell.
    pub unmatched_rows: u64,
    /// Resolved rows whose zone is not part of the warehouse layout.
    pub unknown_zone_rows: u64,
    pub blank_location_rows: u64,
    /// Rows counted toward more than one cell.
    pub multi_matched_rows: u64,
    /// Repeated `(source_id, row_id)` pairs, counted once.
    pub duplicate_rows: u64,
    pub malformed_capacity_cells: u64,
    /// Resolved rows whose quantity was NaN or infinite; they contribute 0.
    #[serde(default)]
    pub invalid_quantity_rows: u64,
    /// Layout records skipped or flagged when the layout was indexed.
    #[serde(default)]
    pub invalid_layout_entries: u64,
    /// Bindings dropped when the binding table was built.
    pub rejected_bindings: u64,
    /// Binding keys claimed by more than one target, sorted.
    pub conflicting_keys: Vec<BindingKey>,
}

impl ReconcileDiagnostics {
    /// Whether the run surfaced a configuration problem that needs attention.
    pub fn has_configuration_issues(&self) -> bool {
        !self.conflicting_keys.is_empty() || self.rejected_bindings > 0 || self.invalid_layout_entries > 0
    }
}
