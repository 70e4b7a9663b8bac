//! Cache manager errors.

use ontoview_config::ConfigError;
use thiserror::Error;

use crate::resolve::ResolveError;

/// Errors returned by the set cache manager.
///
/// Load failures wrap the resolver error unchanged; the cache and catalog
/// are left as they were before the call.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("unknown ontology set: {set}")]
    UnknownSet { set: String },

    #[error("unknown version {version} of ontology set {set}")]
    UnknownVersion { set: String, version: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl CacheError {
    pub fn unknown_set(set: impl Into<String>) -> Self {
        Self::UnknownSet { set: set.into() }
    }

    pub fn unknown_version(set: impl Into<String>, version: impl Into<String>) -> Self {
        Self::UnknownVersion {
            set: set.into(),
            version: version.into(),
        }
    }

    /// Unknown set or version, as opposed to a failed load.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::UnknownSet { .. } | Self::UnknownVersion { .. })
    }

    pub fn as_resolve(&self) -> Option<&ResolveError> {
        match self {
            Self::Resolve(e) => Some(e),
            _ => None,
        }
    }
}
