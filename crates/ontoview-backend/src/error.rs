//! Backend error types.
//!
//! Messages are rebuilt from the source error's fields with every path
//! field replaced by [`PATH_PLACEHOLDER`], so a `BackendError` can be shown
//! to a serving layer client as-is.

use ontoview_config::ConfigError;
use ontoview_core::{CacheError, ReadError, ReadErrorKind, ResolveError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sanitize::{sanitize_identifier, sanitize_message, PATH_PLACEHOLDER};

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorKind {
    UnknownSet,
    UnknownVersion,
    /// Missing, oversized or malformed source file
    InvalidSource,
    /// Symlink or base-directory escape
    PathRejected,
    /// Import cycle
    Cycle,
    /// A resolver ceiling was exceeded
    LimitExceeded,
    Config,
    Internal,
}

/// Errors returned across the backend boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Set id not in the catalog
    #[error("unknown ontology set: {set}")]
    UnknownSet { set: String },

    /// Version not declared for the set
    #[error("unknown version {version} of ontology set {set}")]
    UnknownVersion { set: String, version: String },

    /// A source file could not be read or parsed
    #[error("{message}")]
    InvalidSource { source_kind: ReadErrorKind, message: String },

    /// A source path was rejected by the path guards
    #[error("{message}")]
    PathRejected { message: String },

    /// Import cycle; `import_path` holds the (sanitized) identifiers
    #[error("{message}")]
    Cycle {
        import_path: Vec<String>,
        cycle_length: usize,
        message: String,
    },

    /// A resolver ceiling was exceeded
    #[error("{message}")]
    LimitExceeded {
        ceiling: &'static str,
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Background task failed
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl BackendError {
    /// Create an Internal error from any message, sanitized.
    pub fn internal(message: impl AsRef<str>) -> Self {
        Self::Internal {
            message: sanitize_message(message.as_ref()),
        }
    }

    pub fn kind(&self) -> BackendErrorKind {
        match self {
            Self::UnknownSet { .. } => BackendErrorKind::UnknownSet,
            Self::UnknownVersion { .. } => BackendErrorKind::UnknownVersion,
            Self::InvalidSource { .. } => BackendErrorKind::InvalidSource,
            Self::PathRejected { .. } => BackendErrorKind::PathRejected,
            Self::Cycle { .. } => BackendErrorKind::Cycle,
            Self::LimitExceeded { .. } => BackendErrorKind::LimitExceeded,
            Self::Config { .. } => BackendErrorKind::Config,
            Self::Internal { .. } => BackendErrorKind::Internal,
        }
    }

    /// True for lookup failures the caller can fix by naming another
    /// set or version.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownSet { .. } | Self::UnknownVersion { .. })
    }
}

/// Message for a read failure, without the path fields.
fn describe_read(err: &ReadError) -> String {
    let p = PATH_PLACEHOLDER;
    match err {
        ReadError::NotFound { .. } => format!("source file not found: {}", p),
        ReadError::NotAFile { .. } => format!("not a regular file: {}", p),
        ReadError::SymlinkRejected { .. } => format!("symbolic link rejected: {}", p),
        ReadError::PathOutsideBase { .. } => {
            format!("path {} resolves outside allowed base directory {}", p, p)
        }
        ReadError::TooLarge { size, limit, .. } => format!(
            "source file {} is {} bytes, exceeding the {} byte limit",
            p, size, limit
        ),
        ReadError::Parse { message, .. } => {
            format!("failed to parse {}: {}", p, sanitize_message(message))
        }
        ReadError::Io { source, .. } => {
            format!("IO error reading {}: {}", p, sanitize_message(&source.to_string()))
        }
    }
}

/// Message for a configuration failure, without the config file path.
fn describe_config(err: &ConfigError) -> String {
    let p = PATH_PLACEHOLDER;
    match err {
        ConfigError::ReadFile { source, .. } => format!(
            "failed to read config file '{}': {}",
            p,
            sanitize_message(&source.to_string())
        ),
        ConfigError::ParseToml { source, .. } => format!(
            "failed to parse config file '{}': {}",
            p,
            sanitize_message(&source.to_string())
        ),
        other => sanitize_message(&other.to_string()),
    }
}

impl From<ReadError> for BackendError {
    fn from(err: ReadError) -> Self {
        let message = describe_read(&err);
        if err.is_path_rejection() {
            Self::PathRejected { message }
        } else {
            Self::InvalidSource {
                source_kind: err.kind(),
                message,
            }
        }
    }
}

impl From<ResolveError> for BackendError {
    fn from(err: ResolveError) -> Self {
        let ceiling = err.ceiling().unwrap_or("unknown");
        match err {
            ResolveError::Cycle(trace) => {
                let import_path: Vec<String> = trace
                    .import_path
                    .iter()
                    .map(|id| sanitize_identifier(id))
                    .collect();
                let message = format!(
                    "import cycle detected: {} (cycle length {})",
                    import_path.join(" -> "),
                    trace.cycle_length
                );
                Self::Cycle {
                    import_path,
                    cycle_length: trace.cycle_length,
                    message,
                }
            }
            ResolveError::Read(read) => read.into(),
            ResolveError::DepthExceeded {
                limit,
                depth,
                import,
            } => Self::LimitExceeded {
                ceiling,
                message: format!(
                    "import depth limit {} exceeded by {} at depth {}",
                    limit,
                    sanitize_identifier(&import),
                    depth
                ),
            },
            ResolveError::ImportLimitExceeded {
                limit,
                count,
                document,
            } => Self::LimitExceeded {
                ceiling,
                message: format!(
                    "document {} declares {} imports, limit is {}",
                    sanitize_identifier(&document),
                    count,
                    limit
                ),
            },
            ResolveError::DocumentLimitExceeded { limit, attempted } => Self::LimitExceeded {
                ceiling,
                message: format!(
                    "document limit {} exceeded: resolution needs {} documents",
                    limit, attempted
                ),
            },
        }
    }
}

impl From<CacheError> for BackendError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::UnknownSet { set } => Self::UnknownSet { set },
            CacheError::UnknownVersion { set, version } => Self::UnknownVersion { set, version },
            CacheError::Resolve(e) => e.into(),
            CacheError::Config(e) => Self::Config {
                message: describe_config(&e),
            },
        }
    }
}

impl From<tokio::task::JoinError> for BackendError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("load task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoview_core::{CycleTrace, ReadError};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_read_error_is_sanitized() {
        let err: BackendError =
            ResolveError::Read(ReadError::not_found("/home/alice/sets/core.ttl")).into();

        assert_eq!(err.kind(), BackendErrorKind::InvalidSource);
        assert_eq!(err.to_string(), "source file not found: <path>");
        assert!(matches!(
            err,
            BackendError::InvalidSource {
                source_kind: ReadErrorKind::NotFound,
                ..
            }
        ));
    }

    #[test]
    fn test_path_rejection_kept_distinct() {
        let err: BackendError = ResolveError::Read(ReadError::PathOutsideBase {
            path: PathBuf::from("/srv/sets/x/../../etc/passwd"),
            base: PathBuf::from("/srv/sets/x"),
        })
        .into();

        assert_eq!(err.kind(), BackendErrorKind::PathRejected);
        assert!(!err.to_string().contains("/srv"));
        assert!(!err.to_string().contains("passwd"));
    }

    #[test]
    fn test_cycle_keeps_web_iris() {
        let path = vec![
            "http://example.org/a".to_string(),
            "file:///tmp/sets/b.ttl".to_string(),
        ];
        let err: BackendError = ResolveError::Cycle(CycleTrace::new(&path, 0)).into();

        match err {
            BackendError::Cycle {
                import_path,
                cycle_length,
                message,
            } => {
                assert_eq!(
                    import_path,
                    vec!["http://example.org/a", "<path>", "http://example.org/a"]
                );
                assert_eq!(cycle_length, 2);
                assert!(message.contains("http://example.org/a"));
                assert!(!message.contains("/tmp"));
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_ceiling_reports_name() {
        let err: BackendError = ResolveError::DocumentLimitExceeded {
            limit: 2,
            attempted: 3,
        }
        .into();
        assert!(matches!(
            err,
            BackendError::LimitExceeded {
                ceiling: "max_total_documents",
                ..
            }
        ));
    }

    #[test]
    fn test_lookup_errors_pass_through() {
        let err: BackendError = CacheError::unknown_version("elixir", "v9").into();
        assert_eq!(
            err,
            BackendError::UnknownVersion {
                set: "elixir".to_string(),
                version: "v9".to_string()
            }
        );
        assert!(err.is_not_found());
        assert_eq!(err.kind(), BackendErrorKind::UnknownVersion);
    }

    #[test]
    fn test_relative_and_spaced_paths_redacted_whole() {
        let cases = [
            ReadError::not_found("/srv/my ontologies/core.ttl"),
            ReadError::not_found("conf/sets/../../secret/root.ttl"),
            ReadError::parse("my sets/core.ttl", "unexpected end of file"),
            ReadError::PathOutsideBase {
                path: PathBuf::from("onto/v1/../x.ttl"),
                base: PathBuf::from("onto/v1"),
            },
        ];
        for read in cases {
            let err: BackendError = ResolveError::Read(read).into();
            let message = err.to_string();
            assert!(message.contains("<path>"), "{}", message);
            for fragment in ["ontologies", "secret", "sets", "onto/", "x.ttl"] {
                assert!(!message.contains(fragment), "{}", message);
            }
        }
    }

    #[test]
    fn test_ceiling_identifiers_redacted() {
        let err: BackendError = ResolveError::DepthExceeded {
            limit: 3,
            depth: 4,
            import: "file:///srv/my%20sets/deep.ttl".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "import depth limit 3 exceeded by <path> at depth 4"
        );

        let err: BackendError = ResolveError::ImportLimitExceeded {
            limit: 20,
            count: 30,
            document: "http://example.org/core".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "document http://example.org/core declares 30 imports, limit is 20"
        );
    }

    #[test]
    fn test_config_file_path_redacted() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BackendError =
            CacheError::Config(ConfigError::read_file("my configs/ontoview.toml", io)).into();
        assert_eq!(err.kind(), BackendErrorKind::Config);
        assert_eq!(
            err.to_string(),
            "configuration error: failed to read config file '<path>': denied"
        );
    }
}
