//! OntoView Configuration Management
//!
//! Provides the startup configuration for the ontology cache:
//! - Set catalog: every ontology set with its ordered list of versions
//! - Cache sizing and eviction strategy
//! - Import resolver ceilings
//! - Logging
//!
//! Configuration is validated eagerly. A malformed catalog (missing ids,
//! empty version lists, duplicate keys) is rejected by [`OntoviewConfig::validate`]
//! before any set is loaded.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{to_toml_string, ConfigLoader, CONFIG_FILE_NAME};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Default number of loaded sets kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Default maximum import depth below the root document.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default maximum number of documents in one resolution.
pub const DEFAULT_MAX_TOTAL_DOCUMENTS: usize = 100;

/// Default maximum number of imports declared by a single document.
pub const DEFAULT_MAX_IMPORTS_PER_DOCUMENT: usize = 20;

/// Default maximum size of a single source file (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Root configuration for OntoView.
///
/// # Example TOML
///
/// ```toml
/// [cache]
/// capacity = 4
/// strategy = "lfu"
///
/// [resolver]
/// max_depth = 8
///
/// [[sets]]
/// id = "elixir"
/// name = "Elixir Ontology"
/// auto_load = true
/// priority = 1
///
/// [[sets.versions]]
/// version = "v1.17"
/// root_path = "ontologies/elixir/v1.17/core.ttl"
/// default = true
///
/// [sets.versions.release]
/// released_at = "2024-06-12"
/// stable = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OntoviewConfig {
    /// Cache configuration
    pub cache: CacheConfig,

    /// Import resolver ceilings
    pub resolver: ResolverConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Declared ontology sets
    pub sets: Vec<SetConfig>,
}

/// Cache sizing and eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of loaded (set, version) pairs kept in memory
    pub capacity: usize,

    /// Which entry to evict when the cache is full
    pub strategy: EvictionStrategy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            strategy: EvictionStrategy::default(),
        }
    }
}

/// Eviction strategy selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Evict the entry with the oldest last access (default)
    #[default]
    Lru,
    /// Evict the entry with the lowest access counter
    Lfu,
}

impl std::fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lru => write!(f, "lru"),
            Self::Lfu => write!(f, "lfu"),
        }
    }
}

impl std::str::FromStr for EvictionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lru" | "recency" => Ok(Self::Lru),
            "lfu" | "frequency" => Ok(Self::Lfu),
            _ => Err(ConfigError::invalid_value(
                "cache.strategy",
                format!("unknown eviction strategy '{}'. Valid values: lru, lfu", s),
            )),
        }
    }
}

/// Ceilings applied while resolving imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum depth of an imported document (root is depth 0)
    pub max_depth: usize,

    /// Maximum number of documents loaded in one resolution
    pub max_total_documents: usize,

    /// Maximum number of imports declared by one document
    pub max_imports_per_document: usize,

    /// Maximum size of a single source file in bytes
    pub max_file_size_bytes: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_total_documents: DEFAULT_MAX_TOTAL_DOCUMENTS,
            max_imports_per_document: DEFAULT_MAX_IMPORTS_PER_DOCUMENT,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}

/// One declared ontology set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SetConfig {
    /// Unique set identifier (required)
    pub id: String,

    /// Human-readable name
    pub name: Option<String>,

    /// Short description shown in listings
    pub description: Option<String>,

    /// Project homepage
    pub homepage: Option<String>,

    /// Load the default version at startup
    pub auto_load: bool,

    /// Startup load priority (lower loads first)
    pub priority: i32,

    /// Ordered versions (required, non-empty)
    pub versions: Vec<VersionConfig>,
}

impl SetConfig {
    /// Display name, falling back to the set id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// The version flagged as default, or the first declared version.
    pub fn default_version(&self) -> Option<&VersionConfig> {
        self.versions
            .iter()
            .find(|v| v.default)
            .or_else(|| self.versions.first())
    }

    /// Look up a version by its version string.
    pub fn version(&self, version: &str) -> Option<&VersionConfig> {
        self.versions.iter().find(|v| v.version == version)
    }
}

/// One release of a set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VersionConfig {
    /// Version string, unique within its set (required)
    pub version: String,

    /// Path of the root ontology document (required)
    pub root_path: PathBuf,

    /// Directory imports must stay within (defaults to the root's directory)
    pub base_dir: Option<PathBuf>,

    /// Whether this is the set's default version
    pub default: bool,

    /// Release metadata
    pub release: ReleaseInfo,

    /// Explicit import identifier to file path overrides
    pub import_overrides: BTreeMap<String, PathBuf>,
}

impl VersionConfig {
    /// Directory that every file of this version must resolve into.
    pub fn allowed_base(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.clone(),
            None => self
                .root_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Release metadata attached to a version.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ReleaseInfo {
    /// Release date (free-form, typically ISO 8601)
    pub released_at: Option<String>,

    /// Release notes or changelog link
    pub notes: Option<String>,

    /// Whether this is a stable release
    pub stable: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

/// Overrides applied on top of file-based configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override cache capacity
    pub capacity: Option<usize>,

    /// Override eviction strategy
    pub strategy: Option<EvictionStrategy>,

    /// Override log level
    pub log_level: Option<String>,
}

impl OntoviewConfig {
    /// Apply overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(capacity) = overrides.capacity {
            self.cache.capacity = capacity;
        }

        if let Some(strategy) = overrides.strategy {
            self.cache.strategy = strategy;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    ///
    /// Rejects zero-sized ceilings, sets without an id or versions, duplicate
    /// set ids or version strings, and sets with several default versions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::invalid_value(
                "cache.capacity",
                "must be at least 1",
            ));
        }
        if self.resolver.max_total_documents == 0 {
            return Err(ConfigError::invalid_value(
                "resolver.max_total_documents",
                "must be at least 1",
            ));
        }
        if self.resolver.max_file_size_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "resolver.max_file_size_bytes",
                "must be greater than 0",
            ));
        }

        let mut seen_sets = HashSet::new();
        for (i, set) in self.sets.iter().enumerate() {
            if set.id.trim().is_empty() {
                return Err(ConfigError::missing_field(format!("sets[{}].id", i)));
            }
            if !seen_sets.insert(set.id.as_str()) {
                return Err(ConfigError::DuplicateSet {
                    set: set.id.clone(),
                });
            }
            if set.versions.is_empty() {
                return Err(ConfigError::empty_versions(&set.id));
            }

            let mut seen_versions = HashSet::new();
            for (j, version) in set.versions.iter().enumerate() {
                if version.version.trim().is_empty() {
                    return Err(ConfigError::missing_field(format!(
                        "sets[{}].versions[{}].version",
                        i, j
                    )));
                }
                if version.root_path.as_os_str().is_empty() {
                    return Err(ConfigError::missing_field(format!(
                        "sets[{}].versions[{}].root_path",
                        i, j
                    )));
                }
                if !seen_versions.insert(version.version.as_str()) {
                    return Err(ConfigError::DuplicateVersion {
                        set: set.id.clone(),
                        version: version.version.clone(),
                    });
                }
            }

            if set.versions.iter().filter(|v| v.default).count() > 1 {
                return Err(ConfigError::MultipleDefaults {
                    set: set.id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Look up a set by id.
    pub fn set(&self, id: &str) -> Option<&SetConfig> {
        self.sets.iter().find(|s| s.id == id)
    }

    /// Resolve every relative path against `dir`.
    ///
    /// Used by the loader so that paths in a config file are relative to the
    /// file itself rather than the process working directory.
    pub fn resolve_paths(&mut self, dir: &Path) {
        for set in &mut self.sets {
            for version in &mut set.versions {
                version.root_path = absolutize(dir, &version.root_path);
                if let Some(base) = version.base_dir.take() {
                    version.base_dir = Some(absolutize(dir, &base));
                }
                for path in version.import_overrides.values_mut() {
                    *path = absolutize(dir, path);
                }
            }
        }
    }
}

fn absolutize(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}
