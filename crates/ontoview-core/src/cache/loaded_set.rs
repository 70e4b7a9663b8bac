//! Loaded Set
//!
//! One materialized (set, version): its indexed store, per-document
//! ontology metadata and import tree. Everything except the two access
//! fields is immutable once built, so readers holding an `Arc<LoadedSet>`
//! never need the cache lock.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use ontoview_config::{ResolverConfig, VersionConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::resolve::{DocumentMetadata, ImportResolver, ImportTree, ResolveError, ResolveOptions};
use crate::store::{IndexedStore, StoreStats};
use crate::term::SetKey;

/// Counts computed once at load time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedSetStats {
    pub documents: usize,
    pub unresolved_imports: usize,
    pub max_import_depth: usize,
    pub store: StoreStats,
    pub load_duration: Duration,
}

#[derive(Debug)]
pub struct LoadedSet {
    key: SetKey,
    store: IndexedStore,
    /// Document identifier to its metadata
    ontologies: BTreeMap<String, DocumentMetadata>,
    root_identifier: String,
    tree: ImportTree,
    stats: LoadedSetStats,
    loaded_at: SystemTime,
    /// Milliseconds since the Unix epoch
    last_accessed_ms: AtomicU64,
    access_count: AtomicU64,
}

impl LoadedSet {
    /// Resolve the version's root document, build its store and wrap both.
    ///
    /// The load itself counts as the first access.
    pub fn load(
        key: SetKey,
        version: &VersionConfig,
        resolver: &ResolverConfig,
    ) -> Result<Self, ResolveError> {
        let started = Instant::now();
        let options = ResolveOptions::for_version(resolver, version);
        let resolved = ImportResolver::new(options).resolve(&version.root_path)?;
        let store = IndexedStore::build(&resolved.multi_graph);

        let ontologies: BTreeMap<String, DocumentMetadata> = resolved
            .multi_graph
            .iter()
            .map(|doc| (doc.identifier().to_string(), doc.metadata.clone()))
            .collect();
        let root_identifier = resolved
            .multi_graph
            .root()
            .map(|doc| doc.identifier().to_string())
            .unwrap_or_default();

        let stats = LoadedSetStats {
            documents: resolved.multi_graph.len(),
            unresolved_imports: resolved.tree.unresolved().len(),
            max_import_depth: resolved.tree.max_depth(),
            store: store.stats(),
            load_duration: started.elapsed(),
        };
        info!(
            set = %key,
            documents = stats.documents,
            statements = stats.store.statements,
            duration_ms = stats.load_duration.as_millis() as u64,
            "Loaded ontology set"
        );

        Ok(Self::assemble(key, store, ontologies, root_identifier, resolved.tree, stats))
    }

    fn assemble(
        key: SetKey,
        store: IndexedStore,
        ontologies: BTreeMap<String, DocumentMetadata>,
        root_identifier: String,
        tree: ImportTree,
        stats: LoadedSetStats,
    ) -> Self {
        let loaded_at = SystemTime::now();
        Self {
            key,
            store,
            ontologies,
            root_identifier,
            tree,
            stats,
            last_accessed_ms: AtomicU64::new(epoch_millis(loaded_at)),
            loaded_at,
            access_count: AtomicU64::new(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn empty(key: SetKey) -> Self {
        Self::assemble(
            key,
            IndexedStore::default(),
            BTreeMap::new(),
            String::new(),
            ImportTree::new(),
            LoadedSetStats::default(),
        )
    }

    pub fn key(&self) -> &SetKey {
        &self.key
    }

    pub fn set_id(&self) -> &str {
        &self.key.set
    }

    pub fn version(&self) -> &str {
        &self.key.version
    }

    pub fn store(&self) -> &IndexedStore {
        &self.store
    }

    pub fn tree(&self) -> &ImportTree {
        &self.tree
    }

    /// Metadata of every document in the set, keyed by identifier.
    pub fn ontologies(&self) -> &BTreeMap<String, DocumentMetadata> {
        &self.ontologies
    }

    pub fn ontology(&self, identifier: &str) -> Option<&DocumentMetadata> {
        self.ontologies.get(identifier)
    }

    pub fn root_ontology(&self) -> Option<&DocumentMetadata> {
        self.ontologies.get(&self.root_identifier)
    }

    pub fn stats(&self) -> &LoadedSetStats {
        &self.stats
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    pub fn last_accessed(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.last_accessed_ms.load(Ordering::Relaxed))
    }

    pub fn access_count(&self) -> u64 {
        self.access_count.load(Ordering::Relaxed)
    }

    /// Bump the access counter and timestamp. Called under the cache lock.
    pub(crate) fn record_access(&self) {
        self.access_count.fetch_add(1, Ordering::Relaxed);
        self.last_accessed_ms
            .store(epoch_millis(SystemTime::now()), Ordering::Relaxed);
    }
}

fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
