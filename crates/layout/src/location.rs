//! Matching free-text feed locations to layout cells.
//!
//! - `single` cells match a feed location exactly (case-insensitive, trimmed).
//! - `multi-cell` racks match `<CELL>-<digits>-<digits>`, i.e. the rack
//!   location followed by exactly two numeric floor/sub-cell suffixes. The cell
//!   location is anchored on a whole token, so rack `A1` takes `A1-01-02` but
//!   never `A10-01-02`.

use crate::cell::{CellKind, LayoutCell};

/// Comparison key for a location string: trimmed and upper-cased.
pub fn location_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A cell's location rule, prepared once and evaluated per feed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationPattern {
    Exact(String),
    Rack(String),
}

impl LocationPattern {
    /// Build the rule for a cell; `None` when the cell has no location.
    pub fn for_cell(cell: &LayoutCell) -> Option<Self> {
        let base = location_key(&cell.location);
        if base.is_empty() {
            return None;
        }
        Some(match cell.kind() {
            CellKind::Single => LocationPattern::Exact(base),
            CellKind::MultiCell => LocationPattern::Rack(base),
        })
    }

    /// Evaluate against an already-keyed feed location (see [`location_key`]).
    pub fn matches_key(&self, row_key: &str) -> bool {
        if row_key.is_empty() {
            return false;
        }
        match self {
            LocationPattern::Exact(base) => row_key == base,
            LocationPattern::Rack(base) => row_key
                .strip_prefix(base.as_str())
                .and_then(|rest| rest.strip_prefix('-'))
                .is_some_and(is_floor_and_slot),
        }
    }
}

/// Whether `row_location` belongs to `cell`.
pub fn matches(cell: &LayoutCell, row_location: &str) -> bool {
    LocationPattern::for_cell(cell).is_some_and(|p| p.matches_key(&location_key(row_location)))
}

// `<digits>-<digits>`, nothing else.
fn is_floor_and_slot(suffix: &str) -> bool {
    let mut parts = suffix.split('-');
    let (Some(floor), Some(slot), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    is_digits(floor) && is_digits(slot)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rackview_core::{CellId, ZoneId};

    fn single(location: &str) -> LayoutCell {
        LayoutCell::single(CellId::new(), ZoneId::new(), location, 1)
    }

    fn rack(location: &str) -> LayoutCell {
        LayoutCell::multi_cell(CellId::new(), ZoneId::new(), location, 2, 2)
    }

    #[test]
    fn single_is_exact_and_case_insensitive() {
        assert!(matches(&single("B1"), "b1 "));
        assert!(matches(&single(" b1"), "B1"));
        assert!(!matches(&single("B1"), "B10"));
        assert!(!matches(&single("B1"), "B1-01-01"));
    }

    #[test]
    fn rack_takes_two_numeric_suffixes() {
        assert!(matches(&rack("A1"), "A1-01-02"));
        assert!(matches(&rack("a1"), " a1-1-2 "));
        assert!(matches(&rack("A1"), "A1-001-0002"));
    }

    #[test]
    fn rack_anchors_on_whole_token() {
        assert!(!matches(&rack("A1"), "A10-01-02"));
        assert!(!matches(&rack("A1"), "XA1-01-02"));
    }

    #[test]
    fn rack_rejects_wrong_suffix_shapes() {
        let cell = rack("A1");
        for loc in ["A1", "A1-01", "A1-01-", "A1--02", "A1-01-02-03", "A1-0A-02", "A1-01-02X", "A101-02"] {
            assert!(!matches(&cell, loc), "{loc} should not match");
        }
    }

    #[test]
    fn rack_location_may_itself_contain_hyphens() {
        assert!(matches(&rack("K-12"), "k-12-03-04"));
        assert!(!matches(&rack("K-12"), "K-120-03-04"));
    }

    #[test]
    fn blank_locations_never_match() {
        assert!(!matches(&single("  "), "  "));
        assert!(!matches(&single("B1"), ""));
        assert!(LocationPattern::for_cell(&rack(" ")).is_none());
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        assert!(!matches(&rack("A1"), "A1-\u{0661}-02"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn rack_accepts_any_numeric_suffix(base in "[A-Z][A-Z0-9]{0,4}", floor in 0u32..1000, slot in 0u32..1000) {
            let loc = format!("{base}-{floor:02}-{slot:02}");
            prop_assert!(matches(&rack(&base), &loc));
        }

        #[test]
        fn longer_token_never_matches_shorter_rack(base in "[A-Z][0-9]{1,3}", extra in "[0-9A-Z]{1,2}", floor in 0u32..100, slot in 0u32..100) {
            let loc = format!("{base}{extra}-{floor:02}-{slot:02}");
            prop_assert!(!matches(&rack(&base), &loc));
        }
    }
}
