//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
///
/// Every variant is reported at startup; nothing is deferred to the first
/// request against a set.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize configuration
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A required field is absent or empty
    #[error("missing required configuration field '{key}'")]
    MissingField { key: String },

    /// A set declares no versions
    #[error("set '{set}' declares no versions")]
    EmptyVersions { set: String },

    /// Two sets share the same identifier
    #[error("set '{set}' is declared more than once")]
    DuplicateSet { set: String },

    /// Two versions of one set share the same version string
    #[error("version '{version}' of set '{set}' is declared more than once")]
    DuplicateVersion { set: String, version: String },

    /// More than one version of a set is flagged as default
    #[error("set '{set}' flags more than one version as default")]
    MultipleDefaults { set: String },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    /// Create a new ReadFile error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a new ParseToml error.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    /// Create a new MissingField error.
    pub fn missing_field(key: impl Into<String>) -> Self {
        Self::MissingField { key: key.into() }
    }

    /// Create a new EmptyVersions error.
    pub fn empty_versions(set: impl Into<String>) -> Self {
        Self::EmptyVersions { set: set.into() }
    }

    /// Create a new InvalidValue error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
