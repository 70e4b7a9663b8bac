//! Cross-set IRI index.
//!
//! Maps every subject IRI of every loaded set to the keys holding it. Keys
//! are kept in commit order so that an IRI shared by several sets resolves
//! to the earliest committed one still loaded.

use std::collections::HashMap;

use crate::term::SetKey;

#[derive(Debug, Clone, Default)]
pub struct IriIndex {
    /// IRI to the sets containing it, oldest commit first
    by_iri: HashMap<String, Vec<SetKey>>,
    /// Set to the IRIs it registered
    by_set: HashMap<SetKey, Vec<String>>,
}

impl IriIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the subject IRIs of `key`, replacing any earlier registration.
    pub fn insert_set<I, S>(&mut self, key: &SetKey, iris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remove_set(key);

        let iris: Vec<String> = iris.into_iter().map(Into::into).collect();
        for iri in &iris {
            let keys = self.by_iri.entry(iri.clone()).or_default();
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        self.by_set.insert(key.clone(), iris);
    }

    /// Drop every IRI registered by `key`. Returns how many were registered.
    pub fn remove_set(&mut self, key: &SetKey) -> usize {
        let Some(iris) = self.by_set.remove(key) else {
            return 0;
        };
        for iri in &iris {
            if let Some(keys) = self.by_iri.get_mut(iri) {
                keys.retain(|k| k != key);
                if keys.is_empty() {
                    self.by_iri.remove(iri);
                }
            }
        }
        iris.len()
    }

    /// The earliest committed set still holding `iri`.
    pub fn resolve(&self, iri: &str) -> Option<&SetKey> {
        self.by_iri.get(iri).and_then(|keys| keys.first())
    }

    /// Every loaded set holding `iri`, oldest commit first.
    pub fn sets_for(&self, iri: &str) -> &[SetKey] {
        self.by_iri.get(iri).map_or(&[][..], Vec::as_slice)
    }

    /// Number of distinct indexed IRIs.
    pub fn len(&self) -> usize {
        self.by_iri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_iri.is_empty()
    }

    pub fn set_count(&self) -> usize {
        self.by_set.len()
    }
}
