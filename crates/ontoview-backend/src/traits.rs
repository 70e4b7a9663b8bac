//! Backend trait definition.
//!
//! Defines the async interface a serving layer uses to reach the set cache.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{CacheStatsInfo, IriLocation, SetDetails, SetSummary, VersionSummary};

/// Backend for ontology set operations.
///
/// Every error returned through this trait has had local filesystem paths
/// redacted.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List declared sets, ordered by priority then id. Never loads.
    async fn list_sets(&self) -> Result<Vec<SetSummary>, BackendError>;

    /// List the declared versions of a set. Never loads.
    async fn list_versions(&self, set: &str) -> Result<Vec<VersionSummary>, BackendError>;

    /// Get a loaded set, loading it on a miss.
    ///
    /// # Arguments
    /// * `set` - Set identifier
    /// * `version` - Version string; `None` selects the set's default
    async fn get_set(&self, set: &str, version: Option<&str>)
        -> Result<SetDetails, BackendError>;

    /// Remove a version from the cache.
    ///
    /// # Returns
    /// Whether it was loaded.
    async fn unload_set(&self, set: &str, version: &str) -> Result<bool, BackendError>;

    /// Find the loaded set whose store has `iri` as a subject.
    async fn resolve_iri(&self, iri: &str) -> Result<Option<IriLocation>, BackendError>;

    /// Cache statistics.
    async fn stats(&self) -> Result<CacheStatsInfo, BackendError>;

    /// Check if the backend is able to serve requests.
    async fn health_check(&self) -> Result<bool, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the trait is object-safe
    fn _assert_object_safe(_: &dyn Backend) {}
}
