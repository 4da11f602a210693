//! The external inventory systems that feed the engine.

use serde::{Deserialize, Serialize};

/// Which external system produced a feed row (or a binding targets).
///
/// The two systems use different schemas; by the time rows reach the engine
/// they have been coerced into the same shape, but warehouses opt in to each
/// system separately.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Warehouse management system export.
    Wms,
    /// ERP stock export.
    Sap,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Wms => "wms",
            FeedKind::Sap => "sap",
        }
    }
}

impl core::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
