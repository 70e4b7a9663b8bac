//! Set cache manager integration tests.
//!
//! Exercises lazy loading, LRU/LFU eviction, the cross-set IRI index,
//! metrics, failure isolation and concurrent access.

mod common;

use std::sync::Arc;

use common::{config, iri, set_config, thing, OntologyDir};
use pretty_assertions::assert_eq;

use ontoview_core::{
    CacheError, EvictionStrategy, ReadError, ResolveError, SetCacheManager, SetKey,
};

/// Three independent sets `x`, `y`, `z`, each with version `v1`, plus a
/// second version of `x`.
fn three_sets(dir: &OntologyDir) -> Vec<ontoview_config::SetConfig> {
    let x1 = dir.ontology_in("x/v1", "x", &[]);
    let x2 = dir.ontology_in("x/v2", "x2", &[]);
    let y = dir.ontology_in("y", "y", &[]);
    let z = dir.ontology_in("z", "z", &[]);
    vec![
        set_config("x", &[("v1", &x1), ("v2", &x2)]),
        set_config("y", &[("v1", &y)]),
        set_config("z", &[("v1", &z)]),
    ]
}

fn manager(dir: &OntologyDir, capacity: usize, strategy: EvictionStrategy) -> SetCacheManager {
    let mut cfg = config(three_sets(dir), capacity);
    cfg.cache.strategy = strategy;
    SetCacheManager::new(&cfg).unwrap()
}

// ============================================================================
// Loading and hits
// ============================================================================

#[test]
fn test_miss_then_hit() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 10, EvictionStrategy::Lru);

    let first = cache.get_set("x", "v1").unwrap();
    let second = cache.get_set("x", "v1").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.access_count(), 2);
    assert_eq!(first.stats().documents, 1);

    let stats = cache.get_stats();
    assert_eq!(stats.miss_count, 1);
    assert_eq!(stats.hit_count, 1);
    assert_eq!(stats.load_count, 1);
    assert_eq!(stats.loaded_count, 1);
    assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_versions_are_separate_entries() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 10, EvictionStrategy::Lru);

    cache.get_set("x", "v1").unwrap();
    cache.get_set("x", "v2").unwrap();

    assert_eq!(
        cache.loaded_keys(),
        vec![SetKey::new("x", "v1"), SetKey::new("x", "v2")]
    );
}

#[test]
fn test_catalog_queries_never_load() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 10, EvictionStrategy::Lru);

    let ids: Vec<&str> = cache.list_sets().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "y", "z"]);
    assert_eq!(cache.list_versions("x").unwrap().len(), 2);
    assert_eq!(cache.default_version("x").unwrap(), "v1");
    assert_eq!(cache.loaded_count(), 0);
    assert_eq!(cache.get_stats().miss_count, 0);
}

#[test]
fn test_unknown_set_and_version() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 10, EvictionStrategy::Lru);

    assert!(matches!(
        cache.get_set("nope", "v1"),
        Err(CacheError::UnknownSet { .. })
    ));
    assert!(matches!(
        cache.get_set("x", "v9"),
        Err(CacheError::UnknownVersion { .. })
    ));
    assert!(matches!(
        cache.list_versions("nope"),
        Err(CacheError::UnknownSet { .. })
    ));
    assert_eq!(cache.loaded_count(), 0);
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn test_lru_evicts_oldest_access() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 2, EvictionStrategy::Lru);

    cache.get_set("x", "v1").unwrap();
    cache.get_set("y", "v1").unwrap();
    cache.get_set("z", "v1").unwrap();

    assert!(!cache.is_loaded("x", "v1"));
    assert!(cache.is_loaded("y", "v1"));
    assert!(cache.is_loaded("z", "v1"));
    assert_eq!(cache.get_stats().eviction_count, 1);
}

#[test]
fn test_lru_respects_recent_access() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 2, EvictionStrategy::Lru);

    cache.get_set("x", "v1").unwrap();
    cache.get_set("y", "v1").unwrap();
    cache.get_set("x", "v1").unwrap();
    cache.get_set("z", "v1").unwrap();

    assert!(cache.is_loaded("x", "v1"));
    assert!(!cache.is_loaded("y", "v1"));
}

#[test]
fn test_lfu_evicts_lowest_count() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 2, EvictionStrategy::Lfu);

    cache.get_set("x", "v1").unwrap();
    cache.get_set("y", "v1").unwrap();
    for _ in 0..3 {
        cache.get_set("x", "v1").unwrap();
    }
    cache.get_set("y", "v1").unwrap();
    cache.get_set("z", "v1").unwrap();

    assert!(cache.is_loaded("x", "v1"));
    assert!(!cache.is_loaded("y", "v1"));
    assert!(cache.is_loaded("z", "v1"));
}

#[test]
fn test_reaccess_never_evicts() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 2, EvictionStrategy::Lru);

    cache.get_set("x", "v1").unwrap();
    cache.get_set("y", "v1").unwrap();
    for _ in 0..5 {
        cache.get_set("x", "v1").unwrap();
        cache.get_set("y", "v1").unwrap();
    }

    assert_eq!(cache.get_stats().eviction_count, 0);
    assert_eq!(cache.loaded_count(), 2);
}

#[test]
fn test_capacity_holds_after_every_call() {
    let dir = OntologyDir::new();
    for strategy in [EvictionStrategy::Lru, EvictionStrategy::Lfu] {
        let cache = manager(&dir, 2, strategy);
        let sequence = [
            ("x", "v1"),
            ("y", "v1"),
            ("z", "v1"),
            ("x", "v2"),
            ("x", "v1"),
            ("z", "v1"),
            ("y", "v1"),
            ("x", "v2"),
            ("x", "v2"),
            ("y", "v1"),
        ];
        for (set, version) in sequence {
            cache.get_set(set, version).unwrap();
            assert!(cache.loaded_count() <= cache.capacity());
        }
    }
}

// ============================================================================
// IRI index
// ============================================================================

#[test]
fn test_resolve_iri_only_sees_loaded_sets() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 10, EvictionStrategy::Lru);

    assert_eq!(cache.resolve_iri(&thing("y")), None);

    cache.get_set("y", "v1").unwrap();
    assert_eq!(cache.resolve_iri(&thing("y")), Some(SetKey::new("y", "v1")));
    assert_eq!(cache.resolve_iri(&iri("y")), Some(SetKey::new("y", "v1")));
    assert_eq!(cache.resolve_iri(&thing("x")), None);
}

#[test]
fn test_evicted_set_leaves_iri_index() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 1, EvictionStrategy::Lru);

    cache.get_set("x", "v1").unwrap();
    assert!(cache.resolve_iri(&thing("x")).is_some());

    cache.get_set("y", "v1").unwrap();
    assert_eq!(cache.resolve_iri(&thing("x")), None);
    assert_eq!(cache.resolve_iri(&thing("y")), Some(SetKey::new("y", "v1")));
}

// ============================================================================
// Unload and reload
// ============================================================================

#[test]
fn test_unload_is_idempotent() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 10, EvictionStrategy::Lru);

    cache.get_set("z", "v1").unwrap();
    assert!(cache.unload_set("z", "v1").unwrap());
    assert!(!cache.unload_set("z", "v1").unwrap());

    assert!(!cache.is_loaded("z", "v1"));
    assert_eq!(cache.resolve_iri(&thing("z")), None);
    assert_eq!(cache.get_stats().unload_count, 1);
}

#[test]
fn test_reload_builds_fresh_set() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 10, EvictionStrategy::Lru);

    let before = cache.get_set("z", "v1").unwrap();
    let after = cache.reload_set("z", "v1").unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.access_count(), 1);
    assert_eq!(cache.get_stats().load_count, 2);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_failed_load_leaves_cache_untouched() {
    let dir = OntologyDir::new();
    let mut sets = three_sets(&dir);
    let ghost = dir.path().join("ghost/root.ttl");
    sets.push(set_config("ghost", &[("v1", &ghost)]));
    let cache = SetCacheManager::new(&config(sets, 2)).unwrap();

    cache.get_set("x", "v1").unwrap();
    let err = cache.get_set("ghost", "v1").unwrap_err();

    assert!(matches!(
        err,
        CacheError::Resolve(ResolveError::Read(ReadError::NotFound { .. }))
    ));
    assert_eq!(cache.loaded_keys(), vec![SetKey::new("x", "v1")]);
    assert!(cache.resolve_iri(&thing("x")).is_some());

    let stats = cache.get_stats();
    assert_eq!(stats.load_failure_count, 1);
    assert_eq!(stats.eviction_count, 0);

    // Still usable afterwards
    cache.get_set("y", "v1").unwrap();
    assert_eq!(cache.loaded_count(), 2);
}

#[test]
fn test_cycle_propagates_unchanged() {
    let dir = OntologyDir::new();
    let root = dir.ontology_in("loop", "a", &["b"]);
    dir.ontology_in("loop", "b", &["a"]);
    let cache = SetCacheManager::new(&config(vec![set_config("loop", &[("v1", &root)])], 2))
        .unwrap();

    let err = cache.get_set("loop", "v1").unwrap_err();
    let trace = err
        .as_resolve()
        .and_then(|e| e.cycle_trace())
        .expect("expected a cycle");
    assert_eq!(trace.cycle_length, 2);
    assert_eq!(cache.loaded_count(), 0);
}

#[test]
fn test_invalid_config_rejected_at_startup() {
    let mut cfg = config(vec![set_config::<&str>("empty", &[])], 2);
    assert!(matches!(
        SetCacheManager::new(&cfg),
        Err(CacheError::Config(_))
    ));

    cfg.sets.clear();
    cfg.cache.capacity = 0;
    assert!(matches!(
        SetCacheManager::new(&cfg),
        Err(CacheError::Config(_))
    ));
}

// ============================================================================
// Preload and concurrency
// ============================================================================

#[test]
fn test_preload_auto_sets_by_priority() {
    let dir = OntologyDir::new();
    let mut sets = three_sets(&dir);
    sets[0].auto_load = true;
    sets[0].priority = 2;
    sets[1].auto_load = true;
    sets[1].priority = 1;
    let ghost = dir.path().join("ghost/root.ttl");
    sets.push(set_config("ghost", &[("v1", &ghost)]));
    sets[3].auto_load = true;
    let cache = SetCacheManager::new(&config(sets, 10)).unwrap();

    let report = cache.preload_auto_sets();

    assert_eq!(
        report.loaded,
        vec![SetKey::new("y", "v1"), SetKey::new("x", "v1")]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, SetKey::new("ghost", "v1"));
    assert!(matches!(
        report.failed[0].1.as_resolve(),
        Some(ResolveError::Read(ReadError::NotFound { .. }))
    ));
    assert!(!cache.is_loaded("z", "v1"));
}

#[test]
fn test_concurrent_misses_load_once() {
    let dir = OntologyDir::new();
    let cache = manager(&dir, 10, EvictionStrategy::Lru);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                cache.get_set("x", "v1").unwrap();
            });
        }
    });

    let stats = cache.get_stats();
    assert_eq!(stats.load_count, 1);
    assert_eq!(stats.miss_count, 1);
    assert_eq!(stats.hit_count, 7);
    assert_eq!(stats.loaded[0].access_count, 8);
}
