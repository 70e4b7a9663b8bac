//! Configuration loader.
//!
//! Loads the set catalog from a TOML file, resolves relative paths against
//! the file's directory, applies optional overrides and validates the result.

use crate::error::ConfigError;
use crate::{ConfigOverrides, OntoviewConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "ontoview.toml";

/// Configuration loader.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Overrides applied after parsing, before validation
    overrides: Option<ConfigOverrides>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the given overrides to every loaded configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Default config file location inside a directory.
    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Load and validate a configuration file.
    ///
    /// Relative paths inside the file are resolved against the file's
    /// parent directory.
    pub fn load_file(&self, path: &Path) -> Result<OntoviewConfig, ConfigError> {
        debug!("Loading config from {:?}", path);
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

        let mut config: OntoviewConfig =
            toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.resolve_paths(dir);
        }

        self.finish(config)
    }

    /// Load and validate configuration from a TOML string.
    ///
    /// Paths are kept as written.
    pub fn from_toml_str(&self, content: &str) -> Result<OntoviewConfig, ConfigError> {
        let config: OntoviewConfig =
            toml::from_str(content).map_err(|e| ConfigError::parse_toml("<inline>", e))?;
        self.finish(config)
    }

    fn finish(&self, mut config: OntoviewConfig) -> Result<OntoviewConfig, ConfigError> {
        if let Some(ref overrides) = self.overrides {
            config.apply_overrides(overrides);
        }

        config.validate()?;
        trace!(
            sets = config.sets.len(),
            capacity = config.cache.capacity,
            "Configuration validated"
        );
        Ok(config)
    }
}

/// Serialize a configuration back to TOML.
pub fn to_toml_string(config: &OntoviewConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}
