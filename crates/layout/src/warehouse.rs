use serde::{Deserialize, Serialize};

use rackview_core::{Entity, FeedKind, WarehouseId};

/// A physical warehouse and the feed systems it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    /// Human-facing code, unique across warehouses.
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uses_wms: bool,
    #[serde(default)]
    pub uses_sap: bool,
}

impl Warehouse {
    pub fn new(id: WarehouseId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: String::new(),
            uses_wms: false,
            uses_sap: false,
        }
    }

    pub fn with_feed(mut self, kind: FeedKind) -> Self {
        match kind {
            FeedKind::Wms => self.uses_wms = true,
            FeedKind::Sap => self.uses_sap = true,
        }
        self
    }

    /// Whether this warehouse takes rows from the given feed system.
    pub fn consumes(&self, kind: FeedKind) -> bool {
        match kind {
            FeedKind::Wms => self.uses_wms,
            FeedKind::Sap => self.uses_sap,
        }
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
