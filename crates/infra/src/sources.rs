//! Input seams for a recompute: layout, bindings and feed rows.
//!
//! Each source returns a complete, consistent copy of its data. A source that
//! cannot be read fails the whole recompute; nothing partial is stored.

use std::sync::RwLock;

use thiserror::Error;

use rackview_feed::{RawInventoryRow, SourceBinding};
use rackview_layout::LayoutParts;

#[derive(Debug, Error)]
#[error("{source_name} unavailable: {message}")]
pub struct SourceError {
    pub source_name: &'static str,
    pub message: String,
}

impl SourceError {
    pub fn new(source_name: &'static str, message: impl Into<String>) -> Self {
        Self {
            source_name,
            message: message.into(),
        }
    }
}

pub trait LayoutSource: Send + Sync {
    fn load_layout(&self) -> Result<LayoutParts, SourceError>;
}

pub trait BindingSource: Send + Sync {
    fn load_bindings(&self) -> Result<Vec<SourceBinding>, SourceError>;
}

pub trait RowSource: Send + Sync {
    fn load_rows(&self) -> Result<Vec<RawInventoryRow>, SourceError>;
}

/// All three inputs held in memory; each can be replaced between runs.
#[derive(Debug, Default)]
pub struct InMemoryInputs {
    layout: RwLock<LayoutParts>,
    bindings: RwLock<Vec<SourceBinding>>,
    rows: RwLock<Vec<RawInventoryRow>>,
}

impl InMemoryInputs {
    pub fn new(layout: LayoutParts, bindings: Vec<SourceBinding>, rows: Vec<RawInventoryRow>) -> Self {
        Self {
            layout: RwLock::new(layout),
            bindings: RwLock::new(bindings),
            rows: RwLock::new(rows),
        }
    }

    pub fn set_layout(&self, layout: LayoutParts) {
        if let Ok(mut guard) = self.layout.write() {
            *guard = layout;
        }
    }

    pub fn set_bindings(&self, bindings: Vec<SourceBinding>) {
        if let Ok(mut guard) = self.bindings.write() {
            *guard = bindings;
        }
    }

    pub fn set_rows(&self, rows: Vec<RawInventoryRow>) {
        if let Ok(mut guard) = self.rows.write() {
            *guard = rows;
        }
    }
}

impl LayoutSource for InMemoryInputs {
    fn load_layout(&self) -> Result<LayoutParts, SourceError> {
        self.layout
            .read()
            .map(|l| l.clone())
            .map_err(|_| SourceError::new("layout", "lock poisoned"))
    }
}

impl BindingSource for InMemoryInputs {
    fn load_bindings(&self) -> Result<Vec<SourceBinding>, SourceError> {
        self.bindings
            .read()
            .map(|b| b.clone())
            .map_err(|_| SourceError::new("bindings", "lock poisoned"))
    }
}

impl RowSource for InMemoryInputs {
    fn load_rows(&self) -> Result<Vec<RawInventoryRow>, SourceError> {
        self.rows
            .read()
            .map(|r| r.clone())
            .map_err(|_| SourceError::new("rows", "lock poisoned"))
    }
}
