//! Infrastructure layer: snapshot storage, input sources, recompute wiring, config.

pub mod config;
pub mod fixture;
pub mod reconciler;
pub mod sources;
pub mod store;


pub use config::ReconcileConfig;
pub use reconciler::{ReconcileError, Reconciler};
pub use sources::{BindingSource, InMemoryInputs, LayoutSource, RowSource, SourceError};
pub use store::{AggregateStore, InMemoryAggregateStore, JsonFileAggregateStore, StoreError};
