//! Import Tree
//!
//! Depth-annotated tree of the documents visited by one resolution. Every
//! loaded document appears exactly once as a `Loaded` node. A diamond
//! re-reference adds a `Reused` leaf pointing at the identifier loaded
//! elsewhere, and an import that could not be located or read adds an
//! `Unresolved` leaf carrying the reason.

use std::collections::HashMap;
use std::fmt::{self, Write as _};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use super::ontology_key;

/// Why an import was left unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No override, file reference or conventional file matched
    NotFound,
    /// The located path was a symlink or escaped the allowed base
    PathRejected,
    /// The file was found but could not be read or parsed
    ReadFailed,
}

impl UnresolvedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PathRejected => "path_rejected",
            Self::ReadFailed => "read_failed",
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum NodeStatus {
    Loaded,
    Reused,
    Unresolved(UnresolvedReason),
}

/// One node of the import tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Document identifier for loaded nodes, the declared import otherwise
    pub identifier: String,
    pub depth: usize,
    pub status: NodeStatus,
}

impl TreeNode {
    pub fn is_loaded(&self) -> bool {
        self.status == NodeStatus::Loaded
    }
}

/// Rooted import tree backed by a petgraph `DiGraph`.
#[derive(Debug, Clone, Default)]
pub struct ImportTree {
    graph: DiGraph<TreeNode, ()>,
    root: Option<NodeIndex>,
    /// Canonical identifier key to its `Loaded` node
    loaded: HashMap<String, NodeIndex>,
}

impl ImportTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a loaded document below `parent`; the first call without a parent
    /// sets the root.
    pub(crate) fn add_loaded(
        &mut self,
        parent: Option<NodeIndex>,
        identifier: &str,
        depth: usize,
    ) -> NodeIndex {
        let idx = self.add_node(parent, identifier, depth, NodeStatus::Loaded);
        self.loaded.insert(ontology_key(identifier).to_string(), idx);
        if parent.is_none() && self.root.is_none() {
            self.root = Some(idx);
        }
        idx
    }

    pub(crate) fn add_reused(&mut self, parent: NodeIndex, identifier: &str, depth: usize) {
        self.add_node(Some(parent), identifier, depth, NodeStatus::Reused);
    }

    pub(crate) fn add_unresolved(
        &mut self,
        parent: NodeIndex,
        import: &str,
        depth: usize,
        reason: UnresolvedReason,
    ) {
        self.add_node(
            Some(parent),
            import,
            depth,
            NodeStatus::Unresolved(reason),
        );
    }

    fn add_node(
        &mut self,
        parent: Option<NodeIndex>,
        identifier: &str,
        depth: usize,
        status: NodeStatus,
    ) -> NodeIndex {
        let idx = self.graph.add_node(TreeNode {
            identifier: identifier.to_string(),
            depth,
            status,
        });
        if let Some(parent) = parent {
            self.graph.add_edge(parent, idx, ());
        }
        idx
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.and_then(|idx| self.graph.node_weight(idx))
    }

    /// Children of the loaded document `identifier`, in declaration order.
    pub fn children(&self, identifier: &str) -> Vec<&TreeNode> {
        match self.loaded.get(ontology_key(identifier)) {
            Some(&idx) => self.child_indices(idx).filter_map(|c| self.graph.node_weight(c)).collect(),
            None => Vec::new(),
        }
    }

    fn child_indices(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> {
        // petgraph yields outgoing edges newest first
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(id, _)| id.index());
        edges.into_iter().map(|(_, target)| target)
    }

    /// Depth of a loaded document (root is 0).
    pub fn depth_of(&self, identifier: &str) -> Option<usize> {
        self.loaded
            .get(ontology_key(identifier))
            .and_then(|&idx| self.graph.node_weight(idx))
            .map(|n| n.depth)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.loaded.contains_key(ontology_key(identifier))
    }

    /// Every unresolved import paired with the identifier of its importer.
    pub fn unresolved(&self) -> Vec<(&str, &TreeNode)> {
        self.graph
            .node_indices()
            .filter_map(|idx| {
                let node = self.graph.node_weight(idx)?;
                if !matches!(node.status, NodeStatus::Unresolved(_)) {
                    return None;
                }
                let parent = self
                    .graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .and_then(|p| self.graph.node_weight(p))?;
                Some((parent.identifier.as_str(), node))
            })
            .collect()
    }

    /// Deepest loaded document.
    pub fn max_depth(&self) -> usize {
        self.loaded_nodes().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Loaded documents in insertion (pre-order) order.
    pub fn loaded_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.graph.node_weights().filter(|n| n.is_loaded())
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Total nodes, including reused and unresolved leaves.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Indented text rendering, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.render_node(root, 0, &mut out);
        }
        out
    }

    fn render_node(&self, idx: NodeIndex, indent: usize, out: &mut String) {
        let Some(node) = self.graph.node_weight(idx) else {
            return;
        };
        let marker = match node.status {
            NodeStatus::Loaded => String::new(),
            NodeStatus::Reused => " (already loaded)".to_string(),
            NodeStatus::Unresolved(reason) => format!(" (unresolved: {})", reason),
        };
        let _ = writeln!(out, "{}{}{}", "  ".repeat(indent), node.identifier, marker);
        for child in self.child_indices(idx) {
            self.render_node(child, indent + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diamond() -> ImportTree {
        let mut tree = ImportTree::new();
        let root = tree.add_loaded(None, "http://ex.org/root", 0);
        let a = tree.add_loaded(Some(root), "http://ex.org/a", 1);
        tree.add_loaded(Some(a), "http://ex.org/c", 2);
        let b = tree.add_loaded(Some(root), "http://ex.org/b", 1);
        tree.add_reused(b, "http://ex.org/c", 2);
        tree.add_unresolved(b, "http://ex.org/missing", 2, UnresolvedReason::NotFound);
        tree
    }

    #[test]
    fn test_tree_queries() {
        let tree = diamond();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.node_count(), 6);
        assert_eq!(tree.root().unwrap().identifier, "http://ex.org/root");
        assert_eq!(tree.depth_of("http://ex.org/c"), Some(2));
        assert_eq!(tree.depth_of("http://ex.org/c#"), Some(2));
        assert_eq!(tree.max_depth(), 2);

        let children: Vec<&str> = tree
            .children("http://ex.org/root")
            .iter()
            .map(|n| n.identifier.as_str())
            .collect();
        assert_eq!(children, vec!["http://ex.org/a", "http://ex.org/b"]);

        let b_children = tree.children("http://ex.org/b");
        assert_eq!(b_children[0].status, NodeStatus::Reused);
    }

    #[test]
    fn test_unresolved() {
        let tree = diamond();
        let unresolved = tree.unresolved();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].0, "http://ex.org/b");
        assert_eq!(
            unresolved[0].1.status,
            NodeStatus::Unresolved(UnresolvedReason::NotFound)
        );
    }

    #[test]
    fn test_render() {
        let rendered = diamond().render();
        let expected = "\
http://ex.org/root
  http://ex.org/a
    http://ex.org/c
  http://ex.org/b
    http://ex.org/c (already loaded)
    http://ex.org/missing (unresolved: not_found)
";
        assert_eq!(rendered, expected);
    }
}
