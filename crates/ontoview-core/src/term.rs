//! Term and Statement Model
//!
//! The canonical, parser-independent representation of RDF terms used by the
//! resolver and the triple store. IRIs are always fully expanded strings;
//! prefixed names never survive parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Terms
// ============================================================================

/// An RDF term.
///
/// Equality and hashing are structural, so two literals are equal only when
/// value, datatype and language all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// A named node, stored as its full IRI
    Iri(String),
    /// An anonymous node; local label before stabilization, stable id after
    BlankNode(String),
    /// A literal value
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl Term {
    /// Create an IRI term
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Create a blank node term
    pub fn blank(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    /// Create a plain string literal
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Create a typed literal
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// Create a language-tagged literal
    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// The IRI string, if this is an IRI
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// The lexical value of a literal, if this is a literal
    pub fn literal_value(&self) -> Option<&str> {
        match self {
            Term::Literal { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Renders terms in N-Triples style.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(label) => write!(f, "_:{}", label),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A parsed statement that has not yet been attributed to a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawTriple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl RawTriple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Attach provenance, producing a canonical statement
    pub fn with_source(self, source: impl Into<String>) -> Statement {
        Statement {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            source: source.into(),
        }
    }
}

/// A canonical statement with provenance.
///
/// `source` is the identifier of the document that asserted the statement.
/// Statements from different documents are never merged, even when their
/// subject, predicate and object coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub source: String,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} . # {}",
            self.subject, self.predicate, self.object, self.source
        )
    }
}

// ============================================================================
// Cache Keys
// ============================================================================

/// Two-level cache key: a set and one of its versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SetKey {
    pub set: String,
    pub version: String,
}

impl SetKey {
    pub fn new(set: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            set: set.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for SetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.set, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_display() {
        assert_eq!(Term::iri("http://ex.org/a").to_string(), "<http://ex.org/a>");
        assert_eq!(Term::blank("b0").to_string(), "_:b0");
        assert_eq!(Term::literal("hi").to_string(), "\"hi\"");
        assert_eq!(Term::lang_literal("hi", "en").to_string(), "\"hi\"@en");
        assert_eq!(
            Term::typed_literal("1", "http://www.w3.org/2001/XMLSchema#integer").to_string(),
            "\"1\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn test_literal_equality_is_structural() {
        assert_eq!(Term::literal("a"), Term::literal("a"));
        assert_ne!(Term::literal("a"), Term::lang_literal("a", "en"));
        assert_ne!(
            Term::literal("1"),
            Term::typed_literal("1", "http://www.w3.org/2001/XMLSchema#integer")
        );
    }

    #[test]
    fn test_with_source_keeps_provenance() {
        let raw = RawTriple::new(
            Term::iri("http://ex.org/s"),
            Term::iri("http://ex.org/p"),
            Term::literal("o"),
        );
        let stmt = raw.with_source("http://ex.org/doc");
        assert_eq!(stmt.source, "http://ex.org/doc");
        assert!(stmt.subject.is_iri());
        assert!(stmt.object.is_literal());
    }

    #[test]
    fn test_set_key_display() {
        assert_eq!(SetKey::new("elixir", "v1.17").to_string(), "elixir@v1.17");
    }

    #[test]
    fn test_term_serde_shape() {
        let json = serde_json::to_string(&Term::iri("http://ex.org/a")).unwrap();
        assert_eq!(json, r#"{"type":"iri","value":"http://ex.org/a"}"#);

        let lit = Term::lang_literal("chat", "fr");
        let back: Term = serde_json::from_str(&serde_json::to_string(&lit).unwrap()).unwrap();
        assert_eq!(back, lit);
    }
}
