//! Feed rows and source bindings.
//!
//! Rows arrive from the ingestion adapter already type-coerced; nothing here
//! trims or re-cases them. [`BindingTable`] decides which warehouse (if any)
//! owns a row's `(source_id, partition_key)` pair.

pub mod binding;
pub mod row;

pub use binding::{
    BindingConflict, BindingKey, BindingTable, BindingTableReport, BindingTarget, RejectReason,
    RejectedBinding, Resolution, SourceBinding,
};
pub use row::{PartitionKey, RawInventoryRow, RowId, SourceId};
