//! Canonical Triple Store
//!
//! Flattens a resolved [`MultiGraph`] into a single provenance-tagged
//! statement list with stable blank-node identifiers, indexed by subject,
//! predicate and object.
//!
//! Building is pure: the same multi-graph always yields the same statement
//! order and the same blank-node ids. Documents are walked in multi-graph
//! order, statements in parse order, and within a statement the subject is
//! stabilized before the object.
//!
//! A built store is never mutated. Reloading a set builds a new one.

mod blank_nodes;
mod index;

pub use blank_nodes::{stable_id, BlankNodeMap};
pub use index::TermIndex;

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::resolve::MultiGraph;
use crate::term::{Statement, Term};
use index::TripleIndexes;

/// Summary counts for an [`IndexedStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub statements: usize,
    pub subjects: usize,
    pub predicates: usize,
    pub objects: usize,
    pub blank_nodes: usize,
    pub sources: usize,
}

/// Indexed, immutable statement collection.
#[derive(Debug, Clone, Default)]
pub struct IndexedStore {
    statements: Vec<Statement>,
    indexes: TripleIndexes,
    by_source: HashMap<String, Vec<usize>>,
    blank_nodes: usize,
}

impl IndexedStore {
    /// Build a store from every document of `graph`.
    pub fn build(graph: &MultiGraph) -> Self {
        let (statements, blank_nodes) = stabilize(graph);
        let store = Self::from_statements(statements, blank_nodes.len());
        debug!(
            documents = graph.len(),
            statements = store.len(),
            blank_nodes = store.blank_nodes,
            "Built indexed store"
        );
        store
    }

    /// Index an already canonical statement list.
    pub fn from_statements(statements: Vec<Statement>, blank_nodes: usize) -> Self {
        let indexes = TripleIndexes::build(&statements);

        let mut by_source: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, statement) in statements.iter().enumerate() {
            by_source
                .entry(statement.source.clone())
                .or_default()
                .push(pos);
        }

        Self {
            statements,
            indexes,
            by_source,
            blank_nodes,
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn by_subject<'a>(&'a self, term: &Term) -> impl Iterator<Item = &'a Statement> + 'a {
        self.lookup(&self.indexes.by_subject, term)
    }

    pub fn by_predicate<'a>(&'a self, term: &Term) -> impl Iterator<Item = &'a Statement> + 'a {
        self.lookup(&self.indexes.by_predicate, term)
    }

    pub fn by_object<'a>(&'a self, term: &Term) -> impl Iterator<Item = &'a Statement> + 'a {
        self.lookup(&self.indexes.by_object, term)
    }

    /// Statements asserted by the document `source`.
    pub fn from_source<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a Statement> + 'a {
        let positions = self.by_source.get(source).map_or(&[][..], Vec::as_slice);
        positions.iter().map(move |&pos| &self.statements[pos])
    }

    fn lookup<'a>(
        &'a self,
        index: &'a TermIndex,
        term: &Term,
    ) -> impl Iterator<Item = &'a Statement> + 'a {
        let positions = index.get(term).map_or(&[][..], Vec::as_slice);
        positions.iter().map(move |&pos| &self.statements[pos])
    }

    /// Subject, predicate and object index views.
    pub fn subject_index(&self) -> &TermIndex {
        &self.indexes.by_subject
    }

    pub fn predicate_index(&self) -> &TermIndex {
        &self.indexes.by_predicate
    }

    pub fn object_index(&self) -> &TermIndex {
        &self.indexes.by_object
    }

    /// Every distinct subject.
    pub fn subjects(&self) -> impl Iterator<Item = &Term> {
        self.indexes.by_subject.keys()
    }

    /// Distinct subject IRIs, sorted.
    pub fn subject_iris(&self) -> Vec<&str> {
        let iris: BTreeSet<&str> = self.subjects().filter_map(Term::as_iri).collect();
        iris.into_iter().collect()
    }

    pub fn contains_subject(&self, term: &Term) -> bool {
        self.indexes.by_subject.contains_key(term)
    }

    /// Identifiers of the documents that contributed statements.
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self.by_source.keys().map(String::as_str).collect();
        sources.sort_unstable();
        sources
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            statements: self.statements.len(),
            subjects: self.indexes.by_subject.len(),
            predicates: self.indexes.by_predicate.len(),
            objects: self.indexes.by_object.len(),
            blank_nodes: self.blank_nodes,
            sources: self.by_source.len(),
        }
    }
}

/// Flatten `graph` into canonical statements, rewriting blank nodes.
pub fn stabilize(graph: &MultiGraph) -> (Vec<Statement>, BlankNodeMap) {
    let mut map = BlankNodeMap::new();
    let mut statements = Vec::with_capacity(graph.statement_count());

    for doc in graph.iter() {
        let source = doc.identifier();
        for triple in &doc.triples {
            let subject = rewrite(&mut map, source, &triple.subject);
            let object = rewrite(&mut map, source, &triple.object);
            statements.push(Statement {
                subject,
                predicate: triple.predicate.clone(),
                object,
                source: source.to_string(),
            });
        }
    }

    (statements, map)
}

fn rewrite(map: &mut BlankNodeMap, source: &str, term: &Term) -> Term {
    match term {
        Term::BlankNode(label) => Term::BlankNode(map.stabilize(source, label)),
        other => other.clone(),
    }
}
