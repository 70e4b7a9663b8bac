//! Set catalog: always-resident metadata for every declared set.
//!
//! Never holds triple data and never triggers loading.

use ontoview_config::{ConfigError, OntoviewConfig, SetConfig, VersionConfig};

use super::error::CacheError;

#[derive(Debug, Clone, Default)]
pub struct SetCatalog {
    sets: Vec<SetConfig>,
}

impl SetCatalog {
    /// Build from a validated copy of `config`'s set declarations.
    pub fn from_config(config: &OntoviewConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sets: config.sets.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn set(&self, set: &str) -> Result<&SetConfig, CacheError> {
        self.sets
            .iter()
            .find(|s| s.id == set)
            .ok_or_else(|| CacheError::unknown_set(set))
    }

    pub fn version(&self, set: &str, version: &str) -> Result<&VersionConfig, CacheError> {
        self.set(set)?
            .version(version)
            .ok_or_else(|| CacheError::unknown_version(set, version))
    }

    pub fn versions(&self, set: &str) -> Result<&[VersionConfig], CacheError> {
        Ok(&self.set(set)?.versions)
    }

    pub fn default_version(&self, set: &str) -> Result<&VersionConfig, CacheError> {
        let entry = self.set(set)?;
        // Validation guarantees at least one version
        entry
            .default_version()
            .ok_or_else(|| CacheError::unknown_version(set, "<default>"))
    }

    /// All sets ordered by priority, then id.
    pub fn list(&self) -> Vec<&SetConfig> {
        let mut sets: Vec<&SetConfig> = self.sets.iter().collect();
        sets.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        sets
    }

    /// Sets flagged `auto_load`, in load order.
    pub fn auto_load(&self) -> Vec<&SetConfig> {
        self.list().into_iter().filter(|s| s.auto_load).collect()
    }
}
