//! Term indexes over a statement list.

use std::collections::HashMap;

use crate::term::{Statement, Term};

/// Term to positions in the owning statement list, in statement order.
pub type TermIndex = HashMap<Term, Vec<usize>>;

/// Group statement positions by the term selected with `key`.
pub(crate) fn index_by<F>(statements: &[Statement], key: F) -> TermIndex
where
    F: Fn(&Statement) -> &Term,
{
    let mut index: TermIndex = HashMap::new();
    for (pos, statement) in statements.iter().enumerate() {
        index.entry(key(statement).clone()).or_default().push(pos);
    }
    index
}

/// Subject, predicate and object indexes, built in parallel.
#[derive(Debug, Clone, Default)]
pub(crate) struct TripleIndexes {
    pub by_subject: TermIndex,
    pub by_predicate: TermIndex,
    pub by_object: TermIndex,
}

impl TripleIndexes {
    pub fn build(statements: &[Statement]) -> Self {
        let (by_subject, (by_predicate, by_object)) = rayon::join(
            || index_by(statements, |s| &s.subject),
            || {
                rayon::join(
                    || index_by(statements, |s| &s.predicate),
                    || index_by(statements, |s| &s.object),
                )
            },
        );
        Self {
            by_subject,
            by_predicate,
            by_object,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stmt(s: &str, p: &str, o: Term) -> Statement {
        Statement {
            subject: Term::iri(s),
            predicate: Term::iri(p),
            object: o,
            source: "doc".to_string(),
        }
    }

    #[test]
    fn test_indexes_keep_statement_order() {
        let statements = vec![
            stmt("s1", "p", Term::literal("a")),
            stmt("s2", "p", Term::literal("a")),
            stmt("s1", "q", Term::iri("s2")),
        ];
        let idx = TripleIndexes::build(&statements);

        assert_eq!(idx.by_subject[&Term::iri("s1")], vec![0, 2]);
        assert_eq!(idx.by_predicate[&Term::iri("p")], vec![0, 1]);
        assert_eq!(idx.by_object[&Term::literal("a")], vec![0, 1]);
        assert_eq!(idx.by_object[&Term::iri("s2")], vec![2]);
    }
}
