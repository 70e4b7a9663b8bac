//! Source Reader
//!
//! Validates that a path is a safe, size-bounded, non-symlinked regular file
//! inside an allowed base directory, then parses it into raw statements plus
//! the document's declared base IRI and prefix table.
//!
//! Checks run in a fixed order and each one is terminal for the read:
//!
//! ```text
//! symlink_metadata ─► not found?      ─► NotFound
//!                  ─► symlink?        ─► SymlinkRejected   (never followed)
//!                  ─► not a file?     ─► NotAFile
//! canonicalize     ─► outside base?   ─► PathOutsideBase
//! metadata.len     ─► over ceiling?   ─► TooLarge          (before reading)
//! parse            ─► syntax error?   ─► Parse
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term as OxTerm;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::term::{RawTriple, Term};
use crate::vocab;

/// Errors produced by a single read. None of them yields a partial graph.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("source file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("symbolic link rejected: {path}")]
    SymlinkRejected { path: PathBuf },

    #[error("path {path} resolves outside allowed base directory {base}")]
    PathOutsideBase { path: PathBuf, base: PathBuf },

    #[error("source file {path} is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Machine-readable classification of a [`ReadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadErrorKind {
    NotFound,
    NotAFile,
    SymlinkRejected,
    PathOutsideBase,
    TooLarge,
    Parse,
    Io,
}

impl ReadError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::not_found(path)
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn kind(&self) -> ReadErrorKind {
        match self {
            Self::NotFound { .. } => ReadErrorKind::NotFound,
            Self::NotAFile { .. } => ReadErrorKind::NotAFile,
            Self::SymlinkRejected { .. } => ReadErrorKind::SymlinkRejected,
            Self::PathOutsideBase { .. } => ReadErrorKind::PathOutsideBase,
            Self::TooLarge { .. } => ReadErrorKind::TooLarge,
            Self::Parse { .. } => ReadErrorKind::Parse,
            Self::Io { .. } => ReadErrorKind::Io,
        }
    }

    /// True for the security rejections (symlink or base escape), as
    /// opposed to a missing, oversized or malformed file.
    pub fn is_path_rejection(&self) -> bool {
        matches!(
            self,
            Self::SymlinkRejected { .. } | Self::PathOutsideBase { .. }
        )
    }
}

/// Resource ceilings enforced by the reader.
#[derive(Debug, Clone, Copy)]
pub struct ReaderLimits {
    /// Maximum file size in bytes, checked from metadata before reading
    pub max_file_size_bytes: u64,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: ontoview_config::DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}

/// Header annotations of the document's `owl:Ontology` node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyHeader {
    pub iri: Option<String>,
    pub version_info: Option<String>,
    pub version_iri: Option<String>,
    pub label: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A parsed, not yet attributed source document.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Canonical path of the file
    pub path: PathBuf,
    /// Statements in parse order
    pub triples: Vec<RawTriple>,
    /// Base IRI declared by the document itself (`@base` / `xml:base`)
    pub base_iri: Option<String>,
    /// Prefix table declared by the document
    pub prefixes: BTreeMap<String, String>,
    /// File size in bytes
    pub size_bytes: u64,
}

impl RawDocument {
    /// Subject of the first `rdf:type owl:Ontology` statement.
    pub fn ontology_iri(&self) -> Option<&str> {
        self.triples
            .iter()
            .find(|t| {
                t.predicate.as_iri() == Some(vocab::RDF_TYPE)
                    && t.object.as_iri() == Some(vocab::OWL_ONTOLOGY)
            })
            .and_then(|t| t.subject.as_iri())
    }

    /// Document identifier: declared base IRI, else the ontology IRI, else a
    /// `file://` IRI generated from the canonical path.
    pub fn identifier(&self) -> String {
        self.base_iri
            .clone()
            .or_else(|| self.ontology_iri().map(str::to_string))
            .unwrap_or_else(|| file_iri(&self.path))
    }

    /// Every `owl:imports` target, deduplicated, in declaration order.
    pub fn declared_imports(&self) -> Vec<String> {
        let mut imports: Vec<String> = Vec::new();
        for triple in &self.triples {
            if triple.predicate.as_iri() != Some(vocab::OWL_IMPORTS) {
                continue;
            }
            if let Some(target) = triple.object.as_iri() {
                if !imports.iter().any(|i| i == target) {
                    imports.push(target.to_string());
                }
            }
        }
        imports
    }

    /// Annotations attached to the ontology header node.
    pub fn header(&self) -> OntologyHeader {
        let mut header = OntologyHeader {
            iri: self.ontology_iri().map(str::to_string),
            ..Default::default()
        };
        let Some(ref iri) = header.iri else {
            return header;
        };
        let subject = Term::Iri(iri.clone());

        for triple in self.triples.iter().filter(|t| t.subject == subject) {
            let value = match &triple.object {
                Term::Literal { value, .. } => value.clone(),
                Term::Iri(iri) => iri.clone(),
                Term::BlankNode(_) => continue,
            };
            let slot = match triple.predicate.as_iri() {
                Some(vocab::OWL_VERSION_INFO) => &mut header.version_info,
                Some(vocab::OWL_VERSION_IRI) => &mut header.version_iri,
                Some(vocab::RDFS_LABEL) => &mut header.label,
                Some(vocab::DCTERMS_TITLE) => &mut header.title,
                Some(vocab::RDFS_COMMENT) | Some(vocab::DCTERMS_DESCRIPTION) => {
                    &mut header.description
                }
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        header
    }
}

/// Validating reader bound to one allowed base directory.
#[derive(Debug, Clone)]
pub struct SourceReader {
    allowed_base: PathBuf,
    limits: ReaderLimits,
}

impl SourceReader {
    pub fn new(allowed_base: impl Into<PathBuf>, limits: ReaderLimits) -> Self {
        Self {
            allowed_base: allowed_base.into(),
            limits,
        }
    }

    pub fn allowed_base(&self) -> &Path {
        &self.allowed_base
    }

    pub fn limits(&self) -> ReaderLimits {
        self.limits
    }

    /// Canonical form of the allowed base directory.
    pub fn canonical_base(&self) -> Result<PathBuf, ReadError> {
        std::fs::canonicalize(&self.allowed_base).map_err(|_| ReadError::PathOutsideBase {
            path: self.allowed_base.clone(),
            base: self.allowed_base.clone(),
        })
    }

    /// Validate `path` and parse it.
    pub fn read(&self, path: &Path) -> Result<RawDocument, ReadError> {
        let canonical = self.validate(path)?;

        let size = std::fs::metadata(&canonical)
            .map_err(|e| ReadError::io(path, e))?
            .len();
        if size > self.limits.max_file_size_bytes {
            return Err(ReadError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.limits.max_file_size_bytes,
            });
        }

        let bytes = std::fs::read(&canonical).map_err(|e| ReadError::io(path, e))?;
        let format = format_for_path(&canonical);
        trace!(path = ?canonical, ?format, size, "Parsing source document");

        let (triples, base_iri, prefixes) = parse_document(&canonical, &bytes, format)?;
        debug!(
            path = ?canonical,
            statements = triples.len(),
            prefixes = prefixes.len(),
            "Read source document"
        );

        Ok(RawDocument {
            path: canonical,
            triples,
            base_iri,
            prefixes,
            size_bytes: size,
        })
    }

    /// Run the path checks without reading content; returns the canonical path.
    pub fn validate(&self, path: &Path) -> Result<PathBuf, ReadError> {
        let meta = std::fs::symlink_metadata(path).map_err(|e| ReadError::io(path, e))?;

        if meta.file_type().is_symlink() {
            return Err(ReadError::SymlinkRejected {
                path: path.to_path_buf(),
            });
        }
        if !meta.is_file() {
            return Err(ReadError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let canonical = std::fs::canonicalize(path).map_err(|e| ReadError::io(path, e))?;
        let base = self.canonical_base()?;
        if !canonical.starts_with(&base) {
            return Err(ReadError::PathOutsideBase {
                path: path.to_path_buf(),
                base: self.allowed_base.clone(),
            });
        }

        Ok(canonical)
    }
}

/// Pick the RDF syntax from the file extension; Turtle when unknown.
pub fn format_for_path(path: &Path) -> RdfFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("nt") => RdfFormat::NTriples,
        Some("nq") => RdfFormat::NQuads,
        Some("n3") => RdfFormat::N3,
        Some("trig") => RdfFormat::TriG,
        Some("rdf") | Some("owl") | Some("xml") => RdfFormat::RdfXml,
        _ => RdfFormat::Turtle,
    }
}

/// `file://` IRI for a canonical path.
pub fn file_iri(path: &Path) -> String {
    let display = path.to_string_lossy().replace('\\', "/").replace(' ', "%20");
    if display.starts_with('/') {
        format!("file://{}", display)
    } else {
        format!("file:///{}", display)
    }
}

type ParsedDocument = (Vec<RawTriple>, Option<String>, BTreeMap<String, String>);

/// Parse raw bytes, resolving relative IRIs against the file's own IRI.
///
/// The reported base IRI is only the one the document declares; the file
/// IRI used for relative resolution is not reported.
fn parse_document(path: &Path, bytes: &[u8], format: RdfFormat) -> Result<ParsedDocument, ReadError> {
    let fallback_base = file_iri(path);
    let parser = match RdfParser::from_format(format).with_base_iri(fallback_base.as_str()) {
        Ok(parser) => parser,
        Err(_) => RdfParser::from_format(format),
    };
    let mut quads = parser.for_reader(bytes);

    let mut triples = Vec::new();
    for quad in quads.by_ref() {
        let quad = quad.map_err(|e| ReadError::parse(path, e.to_string()))?;
        let subject = convert_term(OxTerm::from(quad.subject))
            .map_err(|m| ReadError::parse(path, m))?;
        let predicate = Term::Iri(quad.predicate.as_str().to_owned());
        let object = convert_term(quad.object).map_err(|m| ReadError::parse(path, m))?;
        triples.push(RawTriple::new(subject, predicate, object));
    }

    let prefixes = quads
        .prefixes()
        .map(|(prefix, iri)| (prefix.to_owned(), iri.to_owned()))
        .collect();
    let base_iri = quads
        .base_iri()
        .filter(|base| *base != fallback_base)
        .map(str::to_owned);

    Ok((triples, base_iri, prefixes))
}

fn convert_term(term: OxTerm) -> Result<Term, String> {
    match term {
        OxTerm::NamedNode(node) => Ok(Term::Iri(node.as_str().to_owned())),
        OxTerm::BlankNode(node) => Ok(Term::BlankNode(node.as_str().to_owned())),
        OxTerm::Literal(literal) => {
            let language = literal.language().map(str::to_owned);
            let datatype = literal.datatype().as_str();
            let datatype = if language.is_some()
                || datatype == vocab::XSD_STRING
                || datatype == vocab::RDF_LANG_STRING
            {
                None
            } else {
                Some(datatype.to_owned())
            };
            Ok(Term::Literal {
                value: literal.value().to_owned(),
                datatype,
                language,
            })
        }
        #[allow(unreachable_patterns)]
        other => Err(format!("unsupported term {}", other)),
    }
}
