use serde::{Deserialize, Serialize};

use crate::binding::BindingKey;

/// Identifier of an ingested feed source (one sheet/export configuration).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub String);

/// Value that subdivides one feed into independently bound groups
/// (e.g. one plant per partition). Empty for unsplit feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(pub String);

/// Identity of an ingested row within its batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl SourceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartitionKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::fmt::Display for RowId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One ingested feed record. Immutable; later batches supersede it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInventoryRow {
    pub row_id: RowId,
    pub source_id: SourceId,
    #[serde(default)]
    pub partition_key: PartitionKey,
    /// Zone as typed in the source system.
    #[serde(default)]
    pub zone: String,
    /// Location as typed in the source system.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub item_code: String,
    #[serde(default)]
    pub lot_key: Option<String>,
    #[serde(default)]
    pub available_qty: Option<f64>,
    #[serde(default)]
    pub total_qty: Option<f64>,
}

impl RawInventoryRow {
    pub fn new(
        row_id: RowId,
        source_id: SourceId,
        partition_key: PartitionKey,
        zone: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            row_id,
            source_id,
            partition_key,
            zone: zone.into(),
            location: location.into(),
            item_code: String::new(),
            lot_key: None,
            available_qty: None,
            total_qty: None,
        }
    }

    pub fn with_item(mut self, item_code: impl Into<String>) -> Self {
        self.item_code = item_code.into();
        self
    }

    pub fn with_lot(mut self, lot_key: impl Into<String>) -> Self {
        self.lot_key = Some(lot_key.into());
        self
    }

    pub fn with_available_qty(mut self, qty: f64) -> Self {
        self.available_qty = Some(qty);
        self
    }

    pub fn with_total_qty(mut self, qty: f64) -> Self {
        self.total_qty = Some(qty);
        self
    }

    /// Quantity used for rollups: available, else total, else one unit.
    ///
    /// A non-finite quantity contributes 0; see [`Self::has_invalid_quantity`].
    pub fn quantity(&self) -> f64 {
        match self.available_qty.or(self.total_qty) {
            Some(q) if q.is_finite() => q,
            Some(_) => 0.0,
            None => 1.0,
        }
    }

    /// The quantity field in use is NaN or infinite.
    pub fn has_invalid_quantity(&self) -> bool {
        self.available_qty
            .or(self.total_qty)
            .is_some_and(|q| !q.is_finite())
    }

    pub fn binding_key(&self) -> BindingKey {
        BindingKey::new(self.source_id.clone(), self.partition_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RawInventoryRow {
        RawInventoryRow::new(RowId(1), SourceId::new("S1"), PartitionKey::new("P1"), "z", "l")
    }

    #[test]
    fn quantity_prefers_available_then_total() {
        assert_eq!(row().quantity(), 1.0);
        assert_eq!(row().with_total_qty(4.0).quantity(), 4.0);
        assert_eq!(row().with_total_qty(4.0).with_available_qty(2.5).quantity(), 2.5);
    }

    #[test]
    fn non_finite_quantity_counts_as_zero() {
        let nan = row().with_available_qty(f64::NAN).with_total_qty(4.0);
        assert_eq!(nan.quantity(), 0.0);
        assert!(nan.has_invalid_quantity());

        let inf = row().with_total_qty(f64::INFINITY);
        assert_eq!(inf.quantity(), 0.0);
        assert!(inf.has_invalid_quantity());

        assert!(!row().has_invalid_quantity());
        assert!(!row().with_total_qty(4.0).has_invalid_quantity());
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let json = serde_json::json!({ "row_id": 7, "source_id": "S1" });
        let row: RawInventoryRow = serde_json::from_value(json).unwrap();
        assert_eq!(row.partition_key, PartitionKey::default());
        assert_eq!(row.binding_key().to_string(), "S1::");
    }
}
