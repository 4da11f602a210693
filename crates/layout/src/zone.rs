//! Zones and zone-code normalization.
//!
//! Zone codes are typed by hand in two unrelated systems, so every comparison
//! goes through [`normalize_zone`]: hyphens are dropped, surrounding
//! whitespace is trimmed and the result is upper-cased. `EA2-A`, `ea2a` and
//! ` EA2A ` are the same zone.
//!
//! Collapsing case and hyphens can merge two zones a human meant to keep
//! apart (`A-1` vs `A1`). That is accepted; [`crate::Layout`] reports such
//! collisions instead of picking one.

use serde::{Deserialize, Serialize};

use rackview_core::{Entity, WarehouseId, ZoneId};

/// Canonicalize a zone identifier. Pure, total and idempotent.
pub fn normalize_zone(raw: &str) -> String {
    let without_hyphens: String = raw.chars().filter(|c| *c != '-').collect();
    without_hyphens.trim().to_uppercase()
}

/// A normalized zone code, usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneKey(String);

impl ZoneKey {
    pub fn new(raw: &str) -> Self {
        Self(normalize_zone(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A zone inside one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub warehouse_id: WarehouseId,
    /// Code as authored, unique within the warehouse.
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl Zone {
    pub fn new(id: ZoneId, warehouse_id: WarehouseId, code: impl Into<String>) -> Self {
        Self {
            id,
            warehouse_id,
            code: code.into(),
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn key(&self) -> ZoneKey {
        ZoneKey::new(&self.code)
    }
}

impl Entity for Zone {
    type Id = ZoneId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
