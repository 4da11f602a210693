//! Source bindings: which warehouse owns a feed partition.
//!
//! The configuration workflow promises that a `(source_id, partition_key)` pair
//! is claimed by at most one warehouse. The table re-checks that promise once,
//! when it is built, and fails closed: a pair claimed by several warehouses
//! resolves to nothing and is reported as a conflict.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use rackview_core::{FeedKind, WarehouseId};
use rackview_layout::Warehouse;

use crate::row::{PartitionKey, RawInventoryRow, SourceId};

/// Composite binding key, rendered as `source_id::partition_key`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BindingKey {
    pub source_id: SourceId,
    pub partition_key: PartitionKey,
}

impl BindingKey {
    pub fn new(source_id: SourceId, partition_key: PartitionKey) -> Self {
        Self {
            source_id,
            partition_key,
        }
    }
}

impl core::fmt::Display for BindingKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}::{}", self.source_id, self.partition_key)
    }
}

/// Where rows of a bound partition belong.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingTarget {
    pub warehouse_id: WarehouseId,
    /// Logical zone for the partition; used when a row carries no zone.
    #[serde(default)]
    pub zone_value: String,
}

/// A binding record as written by the configuration workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBinding {
    pub source_id: SourceId,
    #[serde(default)]
    pub partition_key: PartitionKey,
    pub feed: FeedKind,
    pub warehouse_id: WarehouseId,
    #[serde(default)]
    pub zone_value: String,
}

impl SourceBinding {
    pub fn new(
        feed: FeedKind,
        source_id: impl Into<String>,
        partition_key: impl Into<String>,
        warehouse_id: WarehouseId,
        zone_value: impl Into<String>,
    ) -> Self {
        Self {
            source_id: SourceId::new(source_id),
            partition_key: PartitionKey::new(partition_key),
            feed,
            warehouse_id,
            zone_value: zone_value.into(),
        }
    }

    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.source_id.clone(), self.partition_key.clone())
    }

    fn target(&self) -> BindingTarget {
        BindingTarget {
            warehouse_id: self.warehouse_id,
            zone_value: self.zone_value.clone(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    UnknownWarehouse,
    /// The warehouse does not consume the binding's feed system.
    FeedNotConsumed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedBinding {
    pub binding: SourceBinding,
    pub reason: RejectReason,
}

/// A key claimed with more than one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingConflict {
    pub key: BindingKey,
    /// Claimant warehouses, sorted and de-duplicated.
    pub warehouses: Vec<WarehouseId>,
}

/// What happened while building a [`BindingTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindingTableReport {
    pub accepted: usize,
    pub rejected: Vec<RejectedBinding>,
    pub conflicts: Vec<BindingConflict>,
}

/// Outcome of resolving one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Bound(&'a BindingTarget),
    /// No warehouse claims the key.
    Orphaned,
    /// Several warehouses claim the key; nothing is chosen.
    Conflict(&'a BindingConflict),
}

impl<'a> Resolution<'a> {
    pub fn target(self) -> Option<&'a BindingTarget> {
        match self {
            Resolution::Bound(target) => Some(target),
            Resolution::Orphaned | Resolution::Conflict(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Claim {
    Bound(BindingTarget),
    Conflicted(BindingConflict),
}

/// Validated `(source_id, partition_key) → target` map.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    claims: HashMap<BindingKey, Claim>,
    report: BindingTableReport,
}

impl BindingTable {
    /// Build the table from binding records and the known warehouses.
    ///
    /// Bindings to unknown warehouses, or to warehouses that do not consume the
    /// binding's feed, are rejected. Identical claims collapse into one; any
    /// key left with more than one distinct target becomes a conflict.
    pub fn build<'w>(
        bindings: impl IntoIterator<Item = SourceBinding>,
        warehouses: impl IntoIterator<Item = &'w Warehouse>,
    ) -> Self {
        let warehouses: HashMap<WarehouseId, &Warehouse> =
            warehouses.into_iter().map(|w| (w.id, w)).collect();

        let mut report = BindingTableReport::default();
        let mut targets: BTreeMap<BindingKey, Vec<BindingTarget>> = BTreeMap::new();

        for binding in bindings {
            let reason = match warehouses.get(&binding.warehouse_id) {
                None => Some(RejectReason::UnknownWarehouse),
                Some(wh) if !wh.consumes(binding.feed) => Some(RejectReason::FeedNotConsumed),
                Some(_) => None,
            };
            if let Some(reason) = reason {
                tracing::warn!(
                    key = %binding.key(),
                    warehouse_id = %binding.warehouse_id,
                    feed = %binding.feed,
                    ?reason,
                    "source binding ignored"
                );
                report.rejected.push(RejectedBinding { binding, reason });
                continue;
            }

            report.accepted += 1;
            let claimed = targets.entry(binding.key()).or_default();
            let target = binding.target();
            if !claimed.contains(&target) {
                claimed.push(target);
            }
        }

        let mut claims = HashMap::with_capacity(targets.len());
        for (key, mut claimed) in targets {
            if claimed.len() == 1 {
                if let Some(target) = claimed.pop() {
                    claims.insert(key, Claim::Bound(target));
                }
                continue;
            }

            let mut warehouses: Vec<WarehouseId> = claimed.iter().map(|t| t.warehouse_id).collect();
            warehouses.sort();
            warehouses.dedup();
            tracing::error!(
                key = %key,
                claimants = ?warehouses,
                "binding conflict: partition claimed by more than one target; its rows will be excluded"
            );
            let conflict = BindingConflict {
                key: key.clone(),
                warehouses,
            };
            report.conflicts.push(conflict.clone());
            claims.insert(key, Claim::Conflicted(conflict));
        }

        Self { claims, report }
    }

    pub fn resolve_key(&self, key: &BindingKey) -> Resolution<'_> {
        match self.claims.get(key) {
            None => Resolution::Orphaned,
            Some(Claim::Bound(target)) => Resolution::Bound(target),
            Some(Claim::Conflicted(conflict)) => Resolution::Conflict(conflict),
        }
    }

    pub fn resolve(&self, row: &RawInventoryRow) -> Resolution<'_> {
        self.resolve_key(&row.binding_key())
    }

    pub fn report(&self) -> &BindingTableReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
