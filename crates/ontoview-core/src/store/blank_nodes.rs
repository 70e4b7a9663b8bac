//! Blank-node identity stabilization.
//!
//! Parser labels for anonymous nodes are only meaningful inside the document
//! that produced them. Each distinct `(document, label)` pair is assigned
//! `{document}_bn{counter:04}`, with the counter starting at 1 per document
//! and advancing in discovery order.

use std::collections::HashMap;

/// Stable id for the `counter`-th blank node of `source`.
pub fn stable_id(source: &str, counter: usize) -> String {
    format!("{}_bn{:04}", source, counter)
}

#[derive(Debug, Clone, Default)]
struct DocumentBlankNodes {
    ids: HashMap<String, String>,
    assigned: usize,
}

/// Per-document label to stable id mapping.
#[derive(Debug, Clone, Default)]
pub struct BlankNodeMap {
    documents: HashMap<String, DocumentBlankNodes>,
}

impl BlankNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable id for `label` in `source`, assigning the next counter value on
    /// first sight.
    pub fn stabilize(&mut self, source: &str, label: &str) -> String {
        let doc = self.documents.entry(source.to_string()).or_default();
        if let Some(id) = doc.ids.get(label) {
            return id.clone();
        }
        doc.assigned += 1;
        let id = stable_id(source, doc.assigned);
        doc.ids.insert(label.to_string(), id.clone());
        id
    }

    /// Previously assigned id, without assigning.
    pub fn get(&self, source: &str, label: &str) -> Option<&str> {
        self.documents
            .get(source)
            .and_then(|doc| doc.ids.get(label))
            .map(String::as_str)
    }

    /// Number of blank nodes stabilized for `source`.
    pub fn count_for(&self, source: &str) -> usize {
        self.documents.get(source).map_or(0, |doc| doc.assigned)
    }

    /// Total stabilized blank nodes across all documents.
    pub fn len(&self) -> usize {
        self.documents.values().map(|doc| doc.assigned).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_label_same_document_is_stable() {
        let mut map = BlankNodeMap::new();
        let first = map.stabilize("http://ex.org/a", "b0");
        let again = map.stabilize("http://ex.org/a", "b0");
        assert_eq!(first, "http://ex.org/a_bn0001");
        assert_eq!(first, again);
        assert_eq!(map.count_for("http://ex.org/a"), 1);
    }

    #[test]
    fn test_same_label_different_documents_differ() {
        let mut map = BlankNodeMap::new();
        let a = map.stabilize("http://ex.org/a", "b0");
        let b = map.stabilize("http://ex.org/b", "b0");
        assert_ne!(a, b);
        assert_eq!(b, "http://ex.org/b_bn0001");
    }

    #[test]
    fn test_counters_are_per_document() {
        let mut map = BlankNodeMap::new();
        map.stabilize("a", "x");
        map.stabilize("b", "x");
        assert_eq!(map.stabilize("a", "y"), "a_bn0002");
        assert_eq!(map.get("b", "x"), Some("b_bn0001"));
        assert_eq!(map.get("b", "y"), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_wide_counter() {
        assert_eq!(stable_id("doc", 12345), "doc_bn12345");
    }
}
