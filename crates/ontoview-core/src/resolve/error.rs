//! Import resolution errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reader::ReadError;

/// Path of identifiers that closes an import cycle.
///
/// `import_path` runs from the root to the repeated identifier inclusive, so
/// `A -> B -> A` has `import_path == [A, B, A]` and `cycle_length == 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTrace {
    pub import_path: Vec<String>,
    pub repeated: String,
    pub cycle_length: usize,
}

impl CycleTrace {
    /// Build a trace from the current root-to-here path and the identifier
    /// found on it again. `position` is where `repeated` sits on `path`.
    pub fn new(path: &[String], position: usize) -> Self {
        let repeated = path[position].clone();
        let mut import_path = path.to_vec();
        import_path.push(repeated.clone());
        Self {
            cycle_length: path.len() - position,
            import_path,
            repeated,
        }
    }
}

impl fmt::Display for CycleTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (cycle length {})",
            self.import_path.join(" -> "),
            self.cycle_length
        )
    }
}

/// Errors that abort a whole resolution.
///
/// Unresolvable or unreadable imports are not errors here; they are recorded
/// on the import tree and the parent keeps loading.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("import cycle detected: {0}")]
    Cycle(CycleTrace),

    #[error("import depth limit {limit} exceeded by {import} at depth {depth}")]
    DepthExceeded {
        limit: usize,
        depth: usize,
        import: String,
    },

    #[error("document limit {limit} exceeded: resolution needs {attempted} documents")]
    DocumentLimitExceeded { limit: usize, attempted: usize },

    #[error("document {document} declares {count} imports, limit is {limit}")]
    ImportLimitExceeded {
        limit: usize,
        count: usize,
        document: String,
    },

    /// The root document itself could not be read
    #[error(transparent)]
    Read(#[from] ReadError),
}

impl ResolveError {
    /// Topology errors: cycles and exceeded ceilings. Never worth retrying.
    pub fn is_topology(&self) -> bool {
        !matches!(self, Self::Read(_))
    }

    /// Name of the exceeded ceiling, if this is a ceiling violation.
    pub fn ceiling(&self) -> Option<&'static str> {
        match self {
            Self::DepthExceeded { .. } => Some("max_depth"),
            Self::DocumentLimitExceeded { .. } => Some("max_total_documents"),
            Self::ImportLimitExceeded { .. } => Some("max_imports_per_document"),
            _ => None,
        }
    }

    pub fn cycle_trace(&self) -> Option<&CycleTrace> {
        match self {
            Self::Cycle(trace) => Some(trace),
            _ => None,
        }
    }

    pub fn is_path_rejection(&self) -> bool {
        matches!(self, Self::Read(e) if e.is_path_rejection())
    }
}
