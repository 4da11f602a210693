//! JSON input fixtures: one file carrying layout, bindings and rows.

use std::path::Path;

use serde::{Deserialize, Serialize};

use rackview_feed::{RawInventoryRow, SourceBinding};
use rackview_layout::LayoutParts;

use crate::sources::{InMemoryInputs, SourceError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFixture {
    pub layout: LayoutParts,
    #[serde(default)]
    pub bindings: Vec<SourceBinding>,
    #[serde(default)]
    pub rows: Vec<RawInventoryRow>,
}

impl InputFixture {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path)
            .map_err(|e| SourceError::new("fixture", format!("{}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::new("fixture", format!("{}: {e}", path.display())))
    }

    pub fn into_inputs(self) -> InMemoryInputs {
        InMemoryInputs::new(self.layout, self.bindings, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_fixture() {
        let json = r#"{
            "layout": {
                "warehouses": [{"id": "0190c2a1-0000-7000-8000-000000000001", "code": "W1", "uses_wms": true}],
                "zones": [{"id": "0190c2a1-0000-7000-8000-000000000002",
                           "warehouse_id": "0190c2a1-0000-7000-8000-000000000001",
                           "code": "EA2-A"}],
                "cells": [{"id": "0190c2a1-0000-7000-8000-000000000003",
                           "zone_id": "0190c2a1-0000-7000-8000-000000000002",
                           "location": "B1", "kind": "single", "capacity": 10}]
            },
            "bindings": [{"source_id": "S1", "partition_key": "P1", "feed": "wms",
                          "warehouse_id": "0190c2a1-0000-7000-8000-000000000001"}],
            "rows": [{"row_id": 1, "source_id": "S1", "partition_key": "P1",
                      "zone": "EA2A", "location": "b1", "available_qty": 2.5}]
        }"#;

        let fixture: InputFixture = serde_json::from_str(json).unwrap();
        assert_eq!(fixture.layout.cells.len(), 1);
        assert_eq!(fixture.bindings.len(), 1);
        assert_eq!(fixture.rows[0].quantity(), 2.5);
    }
}
