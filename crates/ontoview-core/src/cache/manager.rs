//! Set Cache Manager
//!
//! Top-level orchestrator: owns the set catalog, materializes `LoadedSet`s
//! on first request and keeps at most `capacity` of them in memory.
//!
//! All cache state (entries, IRI index, metrics) sits behind one mutex, so
//! insert, evict, access bookkeeping and index updates are atomic to
//! concurrent callers. Loads run outside that mutex, serialized per key by a
//! loading lock with a second check once it is held, and only take the mutex
//! to commit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use lru::LruCache;
use ontoview_config::{OntoviewConfig, ResolverConfig, SetConfig, VersionConfig};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::catalog::SetCatalog;
use super::error::CacheError;
use super::eviction::{select_victim, CacheMetrics, EvictionStrategy};
use super::iri_index::IriIndex;
use super::loaded_set::LoadedSet;
use crate::term::SetKey;

/// Per-entry summary reported by [`CacheStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedSetSummary {
    pub key: SetKey,
    pub access_count: u64,
    pub statement_count: usize,
    pub document_count: usize,
}

/// Snapshot of cache state and counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub loaded_count: usize,
    pub capacity: usize,
    pub strategy: EvictionStrategy,
    pub hit_count: u64,
    pub miss_count: u64,
    pub load_count: u64,
    pub load_failure_count: u64,
    pub eviction_count: u64,
    pub unload_count: u64,
    pub hit_rate: f64,
    pub indexed_iris: usize,
    pub uptime: Duration,
    /// Loaded entries, sorted by key
    pub loaded: Vec<LoadedSetSummary>,
}

/// Outcome of [`SetCacheManager::preload_auto_sets`].
#[derive(Debug, Default)]
pub struct PreloadReport {
    pub loaded: Vec<SetKey>,
    /// Keys that failed, with the load error unchanged
    pub failed: Vec<(SetKey, CacheError)>,
}

/// Mutable state guarded by the manager's mutex.
struct CacheState {
    /// Recency-ordered entries; capacity is enforced by the manager
    entries: LruCache<SetKey, Arc<LoadedSet>>,
    iri_index: IriIndex,
    metrics: CacheMetrics,
}

pub struct SetCacheManager {
    catalog: SetCatalog,
    resolver: ResolverConfig,
    capacity: usize,
    strategy: EvictionStrategy,
    state: Mutex<CacheState>,
    /// Per-key loading locks; prevents duplicate concurrent loads
    loading_locks: DashMap<SetKey, Arc<Mutex<()>>>,
    started_at: Instant,
}

impl std::fmt::Debug for SetCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetCacheManager")
            .field("sets", &self.catalog.len())
            .field("capacity", &self.capacity)
            .field("strategy", &self.strategy)
            .field("loaded", &self.state.lock().entries.len())
            .finish()
    }
}

impl SetCacheManager {
    /// Validate `config` and create an empty cache over its catalog.
    pub fn new(config: &OntoviewConfig) -> Result<Self, CacheError> {
        let catalog = SetCatalog::from_config(config)?;
        info!(
            sets = catalog.len(),
            capacity = config.cache.capacity,
            strategy = %config.cache.strategy,
            "Initialized set cache"
        );

        Ok(Self {
            catalog,
            resolver: config.resolver.clone(),
            capacity: config.cache.capacity,
            strategy: config.cache.strategy,
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                iri_index: IriIndex::new(),
                metrics: CacheMetrics::default(),
            }),
            loading_locks: DashMap::new(),
            started_at: Instant::now(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn strategy(&self) -> EvictionStrategy {
        self.strategy
    }

    pub fn catalog(&self) -> &SetCatalog {
        &self.catalog
    }

    // ------------------------------------------------------------------------
    // Catalog (never loads)
    // ------------------------------------------------------------------------

    /// Every declared set, ordered by priority then id.
    pub fn list_sets(&self) -> Vec<&SetConfig> {
        self.catalog.list()
    }

    pub fn list_versions(&self, set: &str) -> Result<&[VersionConfig], CacheError> {
        self.catalog.versions(set)
    }

    pub fn default_version(&self, set: &str) -> Result<&str, CacheError> {
        Ok(self.catalog.default_version(set)?.version.as_str())
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Return the loaded set, loading it on a miss.
    ///
    /// A failed load returns the resolver error unchanged and leaves the
    /// cache as it was.
    pub fn get_set(&self, set: &str, version: &str) -> Result<Arc<LoadedSet>, CacheError> {
        let version_config = self.catalog.version(set, version)?;
        let key = SetKey::new(set, version);

        if let Some(hit) = self.lookup_hit(&key) {
            return Ok(hit);
        }

        // Double-checked: a concurrent loader may have committed meanwhile
        let lock = self.loading_lock(&key);
        let _guard = lock.lock();
        if let Some(hit) = self.lookup_hit(&key) {
            return Ok(hit);
        }

        self.state.lock().metrics.record_miss();
        debug!(set = %key, "Cache miss, loading");

        let loaded = match LoadedSet::load(key.clone(), version_config, &self.resolver) {
            Ok(loaded) => Arc::new(loaded),
            Err(e) => {
                self.state.lock().metrics.record_load_failure();
                warn!(set = %key, error = %e, "Failed to load ontology set");
                return Err(e.into());
            }
        };

        self.commit(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Load the set's default version.
    pub fn get_set_default(&self, set: &str) -> Result<Arc<LoadedSet>, CacheError> {
        let version = self.catalog.default_version(set)?.version.clone();
        self.get_set(set, &version)
    }

    /// Drop any cached copy and load the version again from disk.
    pub fn reload_set(&self, set: &str, version: &str) -> Result<Arc<LoadedSet>, CacheError> {
        self.unload_set(set, version)?;
        self.get_set(set, version)
    }

    /// Load the default version of every `auto_load` set, lowest priority
    /// first. Failures are logged and skipped.
    pub fn preload_auto_sets(&self) -> PreloadReport {
        let mut report = PreloadReport::default();

        for entry in self.catalog.auto_load() {
            let Some(version) = entry.default_version() else {
                continue;
            };
            let key = SetKey::new(&entry.id, &version.version);
            match self.get_set(&entry.id, &version.version) {
                Ok(_) => report.loaded.push(key),
                Err(e) => {
                    warn!(set = %key, error = %e, "Skipping auto-load set");
                    report.failed.push((key, e));
                }
            }
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Preloaded auto-load sets"
        );
        report
    }

    fn lookup_hit(&self, key: &SetKey) -> Option<Arc<LoadedSet>> {
        let mut state = self.state.lock();
        let hit = state.entries.get(key).cloned()?;
        hit.record_access();
        state.metrics.record_hit();
        trace!(set = %key, accesses = hit.access_count(), "Cache hit");
        Some(hit)
    }

    fn loading_lock(&self, key: &SetKey) -> Arc<Mutex<()>> {
        self.loading_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Insert a freshly loaded set, evicting one entry first when full.
    fn commit(&self, key: SetKey, loaded: Arc<LoadedSet>) {
        let mut state = self.state.lock();

        if !state.entries.contains(&key) && state.entries.len() >= self.capacity {
            if let Some(victim) = select_victim(&state.entries, self.strategy) {
                state.entries.pop(&victim);
                state.iri_index.remove_set(&victim);
                state.metrics.record_eviction();
                info!(evicted = %victim, strategy = %self.strategy, "Evicted ontology set");
            }
        }

        state
            .iri_index
            .insert_set(&key, loaded.store().subject_iris());
        state.entries.put(key.clone(), loaded);
        state.metrics.record_load();
        debug!(set = %key, loaded = state.entries.len(), "Committed ontology set");
    }

    // ------------------------------------------------------------------------
    // Removal and lookup
    // ------------------------------------------------------------------------

    /// Remove a loaded version. Idempotent: returns `false` when it was not
    /// loaded.
    pub fn unload_set(&self, set: &str, version: &str) -> Result<bool, CacheError> {
        self.catalog.version(set, version)?;
        let key = SetKey::new(set, version);

        let mut state = self.state.lock();
        if state.entries.pop(&key).is_none() {
            return Ok(false);
        }
        state.iri_index.remove_set(&key);
        state.metrics.record_unload();
        info!(set = %key, "Unloaded ontology set");
        Ok(true)
    }

    /// The loaded set whose store has `iri` as a subject. Only loaded sets
    /// are considered.
    pub fn resolve_iri(&self, iri: &str) -> Option<SetKey> {
        self.state.lock().iri_index.resolve(iri).cloned()
    }

    pub fn is_loaded(&self, set: &str, version: &str) -> bool {
        self.state
            .lock()
            .entries
            .contains(&SetKey::new(set, version))
    }

    /// Keys of every loaded set, sorted.
    pub fn loaded_keys(&self) -> Vec<SetKey> {
        let mut keys: Vec<SetKey> = self
            .state
            .lock()
            .entries
            .iter()
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn loaded_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.state.lock().metrics.clone()
    }

    pub fn get_stats(&self) -> CacheStats {
        let state = self.state.lock();
        let metrics = &state.metrics;

        let mut loaded: Vec<LoadedSetSummary> = state
            .entries
            .iter()
            .map(|(key, set)| LoadedSetSummary {
                key: key.clone(),
                access_count: set.access_count(),
                statement_count: set.store().len(),
                document_count: set.stats().documents,
            })
            .collect();
        loaded.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            loaded_count: state.entries.len(),
            capacity: self.capacity,
            strategy: self.strategy,
            hit_count: metrics.hits,
            miss_count: metrics.misses,
            load_count: metrics.loads,
            load_failure_count: metrics.load_failures,
            eviction_count: metrics.evictions,
            unload_count: metrics.unloads,
            hit_rate: metrics.hit_rate(),
            indexed_iris: state.iri_index.len(),
            uptime: self.started_at.elapsed(),
            loaded,
        }
    }
}
