//! OntoView Core - ontology import resolution and multi-set caching
//!
//! This crate provides the loading pipeline behind OntoView:
//! - Source reading with path, symlink and size guards
//! - Recursive `owl:imports` resolution with cycle detection and ceilings
//! - A canonical, provenance-tagged triple store with term indexes
//! - A bounded LRU/LFU cache of loaded (set, version) pairs

pub mod cache;
pub mod reader;
pub mod resolve;
pub mod store;
pub mod term;
pub mod vocab;

// Term re-exports
pub use term::{RawTriple, SetKey, Statement, Term};

// Reader re-exports
pub use reader::{
    OntologyHeader, RawDocument, ReadError, ReadErrorKind, ReaderLimits, SourceReader,
};

// Resolver re-exports
pub use resolve::{
    ontology_key, CycleTrace, DocumentMetadata, ImportLocator, ImportResolver, ImportTree,
    LocateError, MultiGraph, NodeStatus, ResolveError, ResolveOptions, ResolvedImports,
    SourceGraph, TreeNode, UnresolvedReason,
};

// Store re-exports
pub use store::{BlankNodeMap, IndexedStore, StoreStats};

// Cache re-exports
pub use cache::{
    CacheError, CacheMetrics, CacheStats, EvictionStrategy, IriIndex, LoadedSet,
    LoadedSetStats, LoadedSetSummary, PreloadReport, SetCacheManager, SetCatalog,
};
