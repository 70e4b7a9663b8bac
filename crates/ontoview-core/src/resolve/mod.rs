//! Import Resolver
//!
//! Depth-first loading of a root document and everything it transitively
//! imports via `owl:imports`, producing one provenance-tagged sub-graph per
//! document plus the import tree.
//!
//! ## Traversal state
//!
//! - *visited*: canonical keys of every document already materialized. A
//!   re-reference to a visited document that is not an ancestor is a diamond
//!   and is not loaded again.
//! - *path*: identifiers from the root to the current document. An import of
//!   anything on the path is a cycle and aborts the whole resolution.
//!
//! ## Check order for one document
//!
//! 1. cycle check of every declared import against the path
//! 2. per-document import ceiling
//!
//! then for each import: diamond skip, depth ceiling, locate, running
//! document ceiling, read, recurse. Locate and read failures are soft: the
//! import is logged, recorded as unresolved, and loading continues.

mod error;
mod locator;
mod tree;

pub use error::{CycleTrace, ResolveError};
pub use locator::{ImportLocator, LocateError, CONVENTION_EXTENSIONS};
pub use tree::{ImportTree, NodeStatus, TreeNode, UnresolvedReason};

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ontoview_config::{ResolverConfig, VersionConfig};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::reader::{OntologyHeader, RawDocument, ReaderLimits, SourceReader};
use crate::term::RawTriple;

/// Canonical comparison key for ontology identifiers: a trailing `#` or `/`
/// is not significant.
pub fn ontology_key(identifier: &str) -> &str {
    identifier.trim_end_matches(['#', '/'])
}

// ============================================================================
// Options
// ============================================================================

/// Ceilings and path policy for one resolution.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub max_depth: usize,
    pub max_total_documents: usize,
    pub max_imports_per_document: usize,
    pub max_file_size_bytes: u64,
    /// Every file must resolve inside this directory; defaults to the root
    /// document's directory
    pub allowed_base: Option<PathBuf>,
    /// Import identifier to file path
    pub overrides: BTreeMap<String, PathBuf>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::from_resolver_config(&ResolverConfig::default())
    }
}

impl ResolveOptions {
    pub fn from_resolver_config(config: &ResolverConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_total_documents: config.max_total_documents,
            max_imports_per_document: config.max_imports_per_document,
            max_file_size_bytes: config.max_file_size_bytes,
            allowed_base: None,
            overrides: BTreeMap::new(),
        }
    }

    /// Options for loading one configured version.
    pub fn for_version(config: &ResolverConfig, version: &VersionConfig) -> Self {
        Self {
            allowed_base: Some(version.allowed_base()),
            overrides: version.import_overrides.clone(),
            ..Self::from_resolver_config(config)
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_total_documents(mut self, max: usize) -> Self {
        self.max_total_documents = max;
        self
    }

    pub fn with_max_imports_per_document(mut self, max: usize) -> Self {
        self.max_imports_per_document = max;
        self
    }

    pub fn with_allowed_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.allowed_base = Some(base.into());
        self
    }

    pub fn with_override(mut self, import: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(import.into(), path.into());
        self
    }
}

// ============================================================================
// Output
// ============================================================================

/// Metadata of one loaded document. Final once resolution returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub identifier: String,
    pub path: PathBuf,
    pub prefixes: BTreeMap<String, String>,
    /// Declared imports, deduplicated, in declaration order
    pub imports: Vec<String>,
    /// Declared imports that could not be located or read
    pub unresolved_imports: Vec<String>,
    pub statement_count: usize,
    /// 0 for the root
    pub depth: usize,
    pub loaded_at: SystemTime,
    pub header: OntologyHeader,
}

/// Statements of one document with its metadata.
#[derive(Debug, Clone)]
pub struct SourceGraph {
    pub metadata: DocumentMetadata,
    pub triples: Vec<RawTriple>,
}

impl SourceGraph {
    pub fn identifier(&self) -> &str {
        &self.metadata.identifier
    }
}

/// One sub-graph per loaded document, in depth-first pre-order from the root.
#[derive(Debug, Clone, Default)]
pub struct MultiGraph {
    documents: Vec<SourceGraph>,
}

impl MultiGraph {
    pub fn new(documents: Vec<SourceGraph>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[SourceGraph] {
        &self.documents
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceGraph> {
        self.documents.iter()
    }

    pub fn root(&self) -> Option<&SourceGraph> {
        self.documents.first()
    }

    pub fn get(&self, identifier: &str) -> Option<&SourceGraph> {
        let key = ontology_key(identifier);
        self.documents
            .iter()
            .find(|d| ontology_key(d.identifier()) == key)
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.identifier()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn statement_count(&self) -> usize {
        self.documents.iter().map(|d| d.triples.len()).sum()
    }
}

/// Result of a successful resolution.
#[derive(Debug, Clone)]
pub struct ResolvedImports {
    pub multi_graph: MultiGraph,
    pub tree: ImportTree,
}

// ============================================================================
// Resolver
// ============================================================================

/// Recursive `owl:imports` resolver.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    options: ResolveOptions,
}

impl ImportResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve `root` and its transitive imports.
    ///
    /// Fails on cycles, ceiling violations, or when the root itself cannot be
    /// read. Never returns a partial multi-graph.
    pub fn resolve(&self, root: &Path) -> Result<ResolvedImports, ResolveError> {
        let allowed_base = match &self.options.allowed_base {
            Some(base) => base.clone(),
            None => root
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        let reader = SourceReader::new(
            allowed_base,
            ReaderLimits {
                max_file_size_bytes: self.options.max_file_size_bytes,
            },
        );
        let root_doc = reader.read(root)?;
        let canonical_base = reader.canonical_base()?;

        let mut traversal = Traversal {
            options: &self.options,
            locator: ImportLocator::new(canonical_base, &self.options.overrides),
            reader,
            visited: HashSet::new(),
            path: Vec::new(),
            documents: Vec::new(),
            tree: ImportTree::new(),
        };
        traversal.visit(root_doc, 0, None)?;

        let multi_graph = MultiGraph::new(traversal.documents);
        info!(
            root = ?root,
            documents = multi_graph.len(),
            statements = multi_graph.statement_count(),
            unresolved = traversal.tree.unresolved().len(),
            "Resolved imports"
        );

        Ok(ResolvedImports {
            multi_graph,
            tree: traversal.tree,
        })
    }
}

/// Mutable state threaded through the depth-first traversal.
struct Traversal<'a> {
    options: &'a ResolveOptions,
    reader: SourceReader,
    locator: ImportLocator<'a>,
    visited: HashSet<String>,
    path: Vec<String>,
    documents: Vec<SourceGraph>,
    tree: ImportTree,
}

impl Traversal<'_> {
    fn visit(
        &mut self,
        doc: RawDocument,
        depth: usize,
        parent: Option<NodeIndex>,
    ) -> Result<(), ResolveError> {
        let identifier = doc.identifier();
        let imports = doc.declared_imports();

        self.visited.insert(ontology_key(&identifier).to_string());
        let node = self.tree.add_loaded(parent, &identifier, depth);
        debug!(
            document = %identifier,
            depth,
            imports = imports.len(),
            statements = doc.triples.len(),
            "Loaded document"
        );

        let slot = self.documents.len();
        let header = doc.header();
        self.documents.push(SourceGraph {
            metadata: DocumentMetadata {
                identifier: identifier.clone(),
                path: doc.path.clone(),
                prefixes: doc.prefixes,
                imports: imports.clone(),
                unresolved_imports: Vec::new(),
                statement_count: doc.triples.len(),
                depth,
                loaded_at: SystemTime::now(),
                header,
            },
            triples: doc.triples,
        });
        self.path.push(identifier.clone());

        for import in &imports {
            self.check_cycle(import)?;
        }

        if imports.len() > self.options.max_imports_per_document {
            return Err(ResolveError::ImportLimitExceeded {
                limit: self.options.max_imports_per_document,
                count: imports.len(),
                document: identifier,
            });
        }

        let mut unresolved = Vec::new();
        for import in &imports {
            let child_depth = depth + 1;

            if self.visited.contains(ontology_key(import)) {
                debug!(document = %identifier, import = %import, "Import already loaded");
                self.tree.add_reused(node, import, child_depth);
                continue;
            }

            if child_depth > self.options.max_depth {
                return Err(ResolveError::DepthExceeded {
                    limit: self.options.max_depth,
                    depth: child_depth,
                    import: import.clone(),
                });
            }

            let located = match self.locator.locate(import, &doc.path) {
                Ok(path) => path,
                Err(e) => {
                    let reason = if e.is_path_rejection() {
                        UnresolvedReason::PathRejected
                    } else {
                        UnresolvedReason::NotFound
                    };
                    warn!(document = %identifier, import = %import, reason = %e, "Skipping unresolved import");
                    self.tree.add_unresolved(node, import, child_depth, reason);
                    unresolved.push(import.clone());
                    continue;
                }
            };

            let attempted = self.documents.len() + 1;
            if attempted > self.options.max_total_documents {
                return Err(ResolveError::DocumentLimitExceeded {
                    limit: self.options.max_total_documents,
                    attempted,
                });
            }

            let child = match self.reader.read(&located) {
                Ok(child) => child,
                Err(e) => {
                    let reason = if e.is_path_rejection() {
                        UnresolvedReason::PathRejected
                    } else {
                        UnresolvedReason::ReadFailed
                    };
                    warn!(document = %identifier, import = %import, reason = %e, "Skipping unreadable import");
                    self.tree.add_unresolved(node, import, child_depth, reason);
                    unresolved.push(import.clone());
                    continue;
                }
            };

            // The file may declare an identifier other than the import IRI
            let child_id = child.identifier();
            self.check_cycle(&child_id)?;
            if self.visited.contains(ontology_key(&child_id)) {
                debug!(document = %identifier, import = %import, resolved = %child_id, "Import already loaded");
                self.tree.add_reused(node, &child_id, child_depth);
                continue;
            }

            self.visit(child, child_depth, Some(node))?;
        }

        self.path.pop();
        self.documents[slot].metadata.unresolved_imports = unresolved;
        Ok(())
    }

    fn check_cycle(&self, import: &str) -> Result<(), ResolveError> {
        let key = ontology_key(import);
        match self.path.iter().position(|id| ontology_key(id) == key) {
            Some(position) => {
                let trace = CycleTrace::new(&self.path, position);
                warn!(cycle = %trace, "Import cycle detected");
                Err(ResolveError::Cycle(trace))
            }
            None => Ok(()),
        }
    }
}
