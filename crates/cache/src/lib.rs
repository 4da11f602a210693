//! Client-side read cache for aggregate rollups.
//!
//! Sits in front of the aggregate read API. Concurrent reads of one key share
//! a single fetch; expired entries are served immediately while one
//! background refresh replaces them.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;

pub use cache::{ClientCache, EntryState};
pub use client::{AggregateReader, CachedAggregateClient, ReaderError, StoreReader};
pub use config::CacheConfig;
pub use error::CacheError;
