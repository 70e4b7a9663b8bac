//! Import Locator
//!
//! Maps a declared import identifier to a file path. Strategies are tried in
//! order and the first hit wins:
//!
//! 1. explicit override map (exact identifier, then canonical key)
//! 2. `file://` reference, validated against the allowed base
//! 3. filename convention beside the importing document
//!
//! A located path is not yet trusted: the reader still applies its own
//! symlink, containment and size checks.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::trace;
use walkdir::WalkDir;

use super::ontology_key;

/// Extensions tried, in order, by the filename convention.
pub const CONVENTION_EXTENSIONS: &[&str] = &["ttl", "owl", "rdf", "nt", "n3"];

/// How far below the importing document's directory the convention searches.
const CONVENTION_SEARCH_DEPTH: usize = 3;

/// Failure to map an import to a file. Always a soft failure for the import.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("no file found for import {import}")]
    NotFound { import: String },

    #[error("import {import} rejected: {reason}")]
    PathRejected { import: String, reason: String },
}

impl LocateError {
    fn rejected(import: &str, reason: impl Into<String>) -> Self {
        Self::PathRejected {
            import: import.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_path_rejection(&self) -> bool {
        matches!(self, Self::PathRejected { .. })
    }
}

/// Resolves import identifiers to candidate files.
#[derive(Debug, Clone)]
pub struct ImportLocator<'a> {
    /// Canonicalized allowed base directory
    base: PathBuf,
    overrides: &'a BTreeMap<String, PathBuf>,
}

impl<'a> ImportLocator<'a> {
    /// `canonical_base` must already be canonicalized.
    pub fn new(canonical_base: PathBuf, overrides: &'a BTreeMap<String, PathBuf>) -> Self {
        Self {
            base: canonical_base,
            overrides,
        }
    }

    /// Locate `import`, declared by the document at `importer`.
    pub fn locate(&self, import: &str, importer: &Path) -> Result<PathBuf, LocateError> {
        if let Some(path) = self.from_overrides(import) {
            trace!(import, path = ?path, "Import located via override");
            return Ok(path);
        }

        if let Some(reference) = import.strip_prefix("file://") {
            return self.from_file_reference(import, reference, importer);
        }

        let path = self.by_convention(import, importer)?;
        trace!(import, path = ?path, "Import located by filename convention");
        Ok(path)
    }

    fn from_overrides(&self, import: &str) -> Option<PathBuf> {
        if let Some(path) = self.overrides.get(import) {
            return Some(path.clone());
        }
        let key = ontology_key(import);
        self.overrides
            .iter()
            .find(|(k, _)| ontology_key(k) == key)
            .map(|(_, path)| path.clone())
    }

    fn from_file_reference(
        &self,
        import: &str,
        reference: &str,
        importer: &Path,
    ) -> Result<PathBuf, LocateError> {
        let reference = reference.replace("%20", " ");
        let raw = Path::new(&reference);

        if raw.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(LocateError::rejected(import, "parent directory traversal"));
        }

        let expected = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            importer_dir(importer).join(raw)
        };

        let resolved = match std::fs::canonicalize(&expected) {
            Ok(path) => path,
            Err(_) => {
                return Err(LocateError::NotFound {
                    import: import.to_string(),
                })
            }
        };

        if !resolved.starts_with(&self.base) {
            return Err(LocateError::rejected(import, "outside allowed base directory"));
        }

        // A symlinked component makes the resolved path differ from the
        // written one.
        let written = std::fs::canonicalize(importer_dir(&expected))
            .map(|dir| dir.join(expected.file_name().unwrap_or_default()))
            .unwrap_or_else(|_| expected.clone());
        if written != resolved {
            return Err(LocateError::rejected(import, "resolved path mismatch"));
        }

        Ok(resolved)
    }

    fn by_convention(&self, import: &str, importer: &Path) -> Result<PathBuf, LocateError> {
        let not_found = || LocateError::NotFound {
            import: import.to_string(),
        };

        let stem = convention_stem(import).ok_or_else(not_found)?;
        let names = candidate_names(stem);
        let dir = importer_dir(importer);

        for name in &names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        // Deeper search, deterministic by sorted file name
        let found = WalkDir::new(dir)
            .min_depth(2)
            .max_depth(CONVENTION_SEARCH_DEPTH)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .find(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|n| names.iter().any(|c| c == n))
            })
            .map(|entry| entry.into_path());

        found.ok_or_else(not_found)
    }
}

fn importer_dir(importer: &Path) -> &Path {
    importer
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Last path segment of an identifier, ignoring fragment markers and
/// trailing separators.
fn convention_stem(import: &str) -> Option<&str> {
    let key = ontology_key(import);
    let key = key.split('#').next().unwrap_or(key);
    let stem = key.rsplit(['/', ':']).next()?;
    if stem.is_empty() || stem == "." || stem == ".." {
        None
    } else {
        Some(stem)
    }
}

fn candidate_names(stem: &str) -> Vec<String> {
    let mut names = Vec::with_capacity(CONVENTION_EXTENSIONS.len() + 1);
    let has_known_ext = Path::new(stem)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| CONVENTION_EXTENSIONS.contains(&e));
    if has_known_ext {
        names.push(stem.to_string());
    }
    for ext in CONVENTION_EXTENSIONS {
        names.push(format!("{}.{}", stem, ext));
    }
    names
}
