//! Multi-set cache of loaded ontology versions.
//!
//! - [`SetCatalog`]: declared sets and versions, always resident
//! - [`LoadedSet`]: one materialized (set, version)
//! - [`SetCacheManager`]: bounded LRU/LFU cache plus the cross-set IRI index

mod catalog;
mod error;
mod eviction;
mod iri_index;
mod loaded_set;
mod manager;

pub use catalog::SetCatalog;
pub use error::CacheError;
pub use eviction::{select_victim, CacheMetrics, EvictionStrategy};
pub use iri_index::IriIndex;
pub use loaded_set::{LoadedSet, LoadedSetStats};
pub use manager::{CacheStats, LoadedSetSummary, PreloadReport, SetCacheManager};
