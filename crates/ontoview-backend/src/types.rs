//! Shared types for backend operations.
//!
//! Plain serializable views of catalog entries and loaded sets. None of them
//! carries a filesystem path: root paths are left out, and document
//! identifiers generated from a path (`file:` IRIs) are redacted.

use ontoview_config::{SetConfig, VersionConfig};
use ontoview_core::{CacheStats, DocumentMetadata, LoadedSet, LoadedSetSummary, SetKey};
use serde::{Deserialize, Serialize};

use crate::sanitize::sanitize_identifier;

/// One declared version of a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    /// Version string (e.g., "v1.17")
    pub version: String,

    /// Whether this is the set's default version
    pub is_default: bool,

    /// Whether the version is currently in the cache
    pub loaded: bool,

    /// Release date, as written in the configuration
    pub released_at: Option<String>,

    /// Release notes
    pub notes: Option<String>,

    /// Marked as a stable release
    pub stable: bool,
}

impl VersionSummary {
    pub fn from_config(version: &VersionConfig, is_default: bool, loaded: bool) -> Self {
        Self {
            version: version.version.clone(),
            is_default,
            loaded,
            released_at: version.release.released_at.clone(),
            notes: version.release.notes.clone(),
            stable: version.release.stable,
        }
    }
}

/// One declared set with its versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSummary {
    /// Set identifier
    pub id: String,

    /// Display name (falls back to the id)
    pub name: String,

    pub description: Option<String>,
    pub homepage: Option<String>,

    /// Loaded at startup
    pub auto_load: bool,

    /// Lower values load first
    pub priority: i32,

    /// Default version string
    pub default_version: String,

    /// Versions in declaration order
    pub versions: Vec<VersionSummary>,
}

impl SetSummary {
    /// Build from a catalog entry; `is_loaded` reports cache residency of
    /// each version.
    pub fn from_config(set: &SetConfig, is_loaded: impl Fn(&str) -> bool) -> Self {
        let default_version = set
            .default_version()
            .map(|v| v.version.clone())
            .unwrap_or_default();
        let versions = set
            .versions
            .iter()
            .map(|v| {
                VersionSummary::from_config(v, v.version == default_version, is_loaded(&v.version))
            })
            .collect();

        Self {
            id: set.id.clone(),
            name: set.display_name().to_string(),
            description: set.description.clone(),
            homepage: set.homepage.clone(),
            auto_load: set.auto_load,
            priority: set.priority,
            default_version,
            versions,
        }
    }
}

/// One ontology document inside a loaded set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologySummary {
    /// Document identifier (IRI); `<path>` when generated from the file path
    pub identifier: String,

    /// rdfs:label or dcterms:title of the ontology header
    pub label: Option<String>,

    /// owl:versionInfo
    pub version_info: Option<String>,

    /// Import depth, 0 for the root
    pub depth: usize,

    pub statement_count: usize,

    /// Declared imports
    pub imports: Vec<String>,

    /// Declared imports that could not be loaded
    pub unresolved_imports: Vec<String>,
}

impl From<&DocumentMetadata> for OntologySummary {
    fn from(meta: &DocumentMetadata) -> Self {
        Self {
            identifier: sanitize_identifier(&meta.identifier),
            label: meta
                .header
                .label
                .clone()
                .or_else(|| meta.header.title.clone()),
            version_info: meta.header.version_info.clone(),
            depth: meta.depth,
            statement_count: meta.statement_count,
            imports: meta.imports.iter().map(|i| sanitize_identifier(i)).collect(),
            unresolved_imports: meta
                .unresolved_imports
                .iter()
                .map(|i| sanitize_identifier(i))
                .collect(),
        }
    }
}

/// A loaded (set, version) with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDetails {
    pub set: String,
    pub version: String,

    /// Identifier of the root ontology
    pub root_ontology: Option<String>,

    pub documents: usize,
    pub statements: usize,
    pub subjects: usize,
    pub blank_nodes: usize,
    pub unresolved_imports: usize,
    pub max_import_depth: usize,

    /// Accesses including the load
    pub access_count: u64,

    /// Wall time of the load in milliseconds
    pub load_duration_ms: u64,

    /// Documents ordered by identifier
    pub ontologies: Vec<OntologySummary>,
}

impl From<&LoadedSet> for SetDetails {
    fn from(loaded: &LoadedSet) -> Self {
        let stats = loaded.stats();
        Self {
            set: loaded.set_id().to_string(),
            version: loaded.version().to_string(),
            root_ontology: loaded
                .root_ontology()
                .map(|m| sanitize_identifier(&m.identifier)),
            documents: stats.documents,
            statements: stats.store.statements,
            subjects: stats.store.subjects,
            blank_nodes: stats.store.blank_nodes,
            unresolved_imports: stats.unresolved_imports,
            max_import_depth: stats.max_import_depth,
            access_count: loaded.access_count(),
            load_duration_ms: stats.load_duration.as_millis() as u64,
            ontologies: loaded.ontologies().values().map(OntologySummary::from).collect(),
        }
    }
}

/// Where an IRI is defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IriLocation {
    pub iri: String,
    pub set: String,
    pub version: String,
}

impl IriLocation {
    pub fn new(iri: impl Into<String>, key: SetKey) -> Self {
        Self {
            iri: iri.into(),
            set: key.set,
            version: key.version,
        }
    }
}

/// Cache statistics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatsInfo {
    pub loaded_count: usize,
    pub capacity: usize,

    /// "lru" or "lfu"
    pub strategy: String,

    pub hit_count: u64,
    pub miss_count: u64,
    pub load_count: u64,
    pub load_failure_count: u64,
    pub eviction_count: u64,
    pub unload_count: u64,

    /// Hit rate (0.0 - 1.0)
    pub hit_rate: f64,

    pub uptime_secs: u64,

    /// Loaded entries, sorted by key
    pub loaded: Vec<LoadedSetSummary>,
}

impl From<CacheStats> for CacheStatsInfo {
    fn from(stats: CacheStats) -> Self {
        Self {
            loaded_count: stats.loaded_count,
            capacity: stats.capacity,
            strategy: stats.strategy.to_string(),
            hit_count: stats.hit_count,
            miss_count: stats.miss_count,
            load_count: stats.load_count,
            load_failure_count: stats.load_failure_count,
            eviction_count: stats.eviction_count,
            unload_count: stats.unload_count,
            hit_rate: stats.hit_rate,
            uptime_secs: stats.uptime.as_secs(),
            loaded: stats.loaded,
        }
    }
}
