//! Eviction policy and cache metrics.
//!
//! Entries live in an unbounded `LruCache` whose order tracks recency; the
//! capacity limit is enforced by the manager, which asks [`select_victim`]
//! for one key before inserting a new one into a full cache.

use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};

pub use ontoview_config::EvictionStrategy;

use super::loaded_set::LoadedSet;
use crate::term::SetKey;

/// Counters for cache activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetrics {
    /// Requests served from memory
    pub hits: u64,
    /// Requests that needed a load
    pub misses: u64,
    /// Successful loads committed to the cache
    pub loads: u64,
    /// Failed loads
    pub load_failures: u64,
    /// Entries removed to make room
    pub evictions: u64,
    /// Entries removed on request
    pub unloads: u64,
}

impl CacheMetrics {
    /// Hit rate in `0.0..=1.0`
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_load(&mut self) {
        self.loads += 1;
    }

    pub fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_unload(&mut self) {
        self.unloads += 1;
    }
}

/// Choose the entry to evict, or `None` for an empty cache.
///
/// - `Lru`: the least recently accessed entry.
/// - `Lfu`: the lowest access counter; among equal counters the least
///   recently accessed one wins.
pub fn select_victim(
    entries: &LruCache<SetKey, Arc<LoadedSet>>,
    strategy: EvictionStrategy,
) -> Option<SetKey> {
    match strategy {
        EvictionStrategy::Lru => entries.peek_lru().map(|(key, _)| key.clone()),
        EvictionStrategy::Lfu => {
            let mut victim: Option<(&SetKey, u64)> = None;
            // iter() is most recent first; rev() walks oldest first
            for (key, set) in entries.iter().rev() {
                let count = set.access_count();
                match victim {
                    Some((_, lowest)) if count >= lowest => {}
                    _ => victim = Some((key, count)),
                }
            }
            victim.map(|(key, _)| key.clone())
        }
    }
}
