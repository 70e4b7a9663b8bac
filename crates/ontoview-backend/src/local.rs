//! Local backend implementation.
//!
//! Drives an in-process [`SetCacheManager`]. Loads do file I/O, parsing and
//! index building, so they run on the blocking pool; catalog and index
//! lookups only take the cache lock briefly and run inline.

use std::sync::Arc;

use async_trait::async_trait;
use ontoview_config::OntoviewConfig;
use ontoview_core::{PreloadReport, SetCacheManager};
use tracing::{debug, info, warn};

use crate::error::BackendError;
use crate::traits::Backend;
use crate::types::{CacheStatsInfo, IriLocation, SetDetails, SetSummary, VersionSummary};

/// Backend over an in-process set cache.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    manager: Arc<SetCacheManager>,
}

impl LocalBackend {
    /// Create a backend from a validated configuration.
    ///
    /// Invalid configuration is rejected here rather than on first use.
    pub fn new(config: &OntoviewConfig) -> Result<Self, BackendError> {
        let manager = SetCacheManager::new(config)?;
        Ok(Self::with_manager(Arc::new(manager)))
    }

    /// Wrap an existing manager.
    pub fn with_manager(manager: Arc<SetCacheManager>) -> Self {
        Self { manager }
    }

    /// The underlying cache manager.
    pub fn manager(&self) -> &Arc<SetCacheManager> {
        &self.manager
    }

    /// Load every auto-load set's default version.
    ///
    /// Individual failures are reported in the returned list, typed as for
    /// [`Backend::get_set`]; they do not fail the call.
    pub async fn preload(&self) -> Result<Vec<(String, Option<BackendError>)>, BackendError> {
        let manager = Arc::clone(&self.manager);
        let report: PreloadReport =
            tokio::task::spawn_blocking(move || manager.preload_auto_sets()).await?;

        let mut outcome: Vec<(String, Option<BackendError>)> = report
            .loaded
            .into_iter()
            .map(|key| (key.to_string(), None))
            .collect();
        for (key, err) in report.failed {
            let err = BackendError::from(err);
            warn!(set = %key, kind = ?err.kind(), "Auto-load set failed");
            outcome.push((key.to_string(), Some(err)));
        }
        Ok(outcome)
    }

    fn version_or_default(&self, set: &str, version: Option<&str>) -> Result<String, BackendError> {
        match version {
            Some(v) => Ok(v.to_string()),
            None => Ok(self.manager.default_version(set)?.to_string()),
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn list_sets(&self) -> Result<Vec<SetSummary>, BackendError> {
        let sets = self
            .manager
            .list_sets()
            .into_iter()
            .map(|set| SetSummary::from_config(set, |v| self.manager.is_loaded(&set.id, v)))
            .collect();
        Ok(sets)
    }

    async fn list_versions(&self, set: &str) -> Result<Vec<VersionSummary>, BackendError> {
        let default = self.manager.default_version(set)?;
        let versions = self
            .manager
            .list_versions(set)?
            .iter()
            .map(|v| {
                VersionSummary::from_config(
                    v,
                    v.version == default,
                    self.manager.is_loaded(set, &v.version),
                )
            })
            .collect();
        Ok(versions)
    }

    async fn get_set(
        &self,
        set: &str,
        version: Option<&str>,
    ) -> Result<SetDetails, BackendError> {
        let version = self.version_or_default(set, version)?;
        debug!(set = %set, version = %version, "Backend get_set");

        let manager = Arc::clone(&self.manager);
        let set = set.to_string();
        let loaded = tokio::task::spawn_blocking(move || manager.get_set(&set, &version))
            .await?
            .map_err(BackendError::from)?;

        Ok(SetDetails::from(loaded.as_ref()))
    }

    async fn unload_set(&self, set: &str, version: &str) -> Result<bool, BackendError> {
        let removed = self.manager.unload_set(set, version)?;
        if removed {
            info!(set = %set, version = %version, "Backend unloaded set");
        }
        Ok(removed)
    }

    async fn resolve_iri(&self, iri: &str) -> Result<Option<IriLocation>, BackendError> {
        Ok(self
            .manager
            .resolve_iri(iri)
            .map(|key| IriLocation::new(iri, key)))
    }

    async fn stats(&self) -> Result<CacheStatsInfo, BackendError> {
        Ok(self.manager.get_stats().into())
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        Ok(self.manager.capacity() > 0)
    }
}
