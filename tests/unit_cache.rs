//! Unit tests for the plan cache


use std::num::NonZeroUsize;

use generators::{field, iota, spacetime, structure};
use tensorex::indices as ti;
use tensorex::{
    CacheConfig, CacheStats, DEFAULT_PLAN_CACHE_CAPACITY, ExprError, PlanCache, Tensor,
    TensorStructure, Valence, evaluate, evaluate_into,
};

use Valence::{Lo, Up};

#[test]
fn test_default_capacity() {
    let config = CacheConfig::default();
    assert_eq!(config.capacity.get(), DEFAULT_PLAN_CACHE_CAPACITY);
    assert!(PlanCache::default().is_empty());
}

#[test]
fn test_same_shape_reuses_plan() {
    let mut cache = PlanCache::default();
    let mut results = Vec::new();

    // Same shape, different values: one plan
    for start in [1.0, 5.0, -3.0] {
        let r = iota(TensorStructure::asymmetric(vec![spacetime(Up)]), start, |x| x);
        let s = iota(TensorStructure::asymmetric(vec![spacetime(Lo)]), start + 1.0, |x| x);
        let expr = r.ix(&[ti::A]) * s.ix(&[ti::a]);
        let cached = cache.evaluate(&[], &expr).unwrap();
        assert_eq!(cached, evaluate(&[], &expr).unwrap());
        results.push(cached);
    }

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats(), CacheStats { hits: 2, misses: 1 });
    assert_ne!(results[0], results[1]);
}

#[test]
fn test_output_order_and_target_are_part_of_key() {
    let mut cache = PlanCache::default();
    let f = iota(
        TensorStructure::asymmetric(vec![spacetime(Lo), spacetime(Lo)]),
        1.0,
        field,
    );
    let expr = f.ix(&[ti::a, ti::b]);

    let ab = cache.evaluate(&[ti::a, ti::b], &expr).unwrap();
    let ba = cache.evaluate(&[ti::b, ti::a], &expr).unwrap();
    assert_eq!(ab.get(&[1, 2]), ba.get(&[2, 1]));
    assert_eq!(cache.len(), 2);

    let mut target = Tensor::new(f.structure().clone(), field(0.0));
    cache.evaluate_into(&mut target, &[ti::a, ti::b], &expr).unwrap();
    assert_eq!(target, f);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.stats().hits, 0);
}

#[test]
fn test_alternating_output_orders_match_uncached() {
    let mut cache = PlanCache::default();
    let f = iota(
        TensorStructure::asymmetric(vec![spacetime(Lo), spacetime(Lo)]),
        1.0,
        field,
    );
    let expr = f.ix(&[ti::a, ti::b]);

    for output in [[ti::a, ti::b], [ti::b, ti::a], [ti::a, ti::b], [ti::b, ti::a]] {
        let cached = cache.evaluate(&output, &expr).unwrap();
        let fresh = evaluate(&output, &expr).unwrap();
        assert_eq!(cached, fresh);
        assert_eq!(cached.get(&[1, 0]), fresh.get(&[1, 0]));
    }
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats(), CacheStats { hits: 2, misses: 2 });
}

#[test]
fn test_in_place_matches_uncached() {
    let mut cache = PlanCache::default();
    let r = iota(TensorStructure::asymmetric(vec![spacetime(Lo)]), 1.0, |x| x);
    let target = structure(&[2, 1, 1], vec![spacetime(Up), spacetime(Lo), spacetime(Lo)]);

    let mut cached = Tensor::new(target.clone(), f64::MAX);
    let mut direct = Tensor::new(target, f64::MAX);
    let expr = r.ix(&[ti::a]) * r.ix(&[ti::b]);
    for _ in 0..2 {
        cache
            .evaluate_into(&mut cached, &[ti::T, ti::b, ti::a], &expr)
            .unwrap();
    }
    evaluate_into(&mut direct, &[ti::T, ti::b, ti::a], &expr).unwrap();

    assert_eq!(cached, direct);
    assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
}

#[test]
fn test_lru_eviction_and_clear() {
    let config = CacheConfig {
        capacity: NonZeroUsize::MIN,
    };
    let mut cache = PlanCache::new(config);
    let v = iota(TensorStructure::asymmetric(vec![spacetime(Lo)]), 1.0, |x| x);

    cache.evaluate(&[ti::a], &v.ix(&[ti::a])).unwrap();
    cache.evaluate(&[ti::a], &(2.0 * v.ix(&[ti::a]))).unwrap();
    cache.evaluate(&[ti::a], &v.ix(&[ti::a])).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 3 });

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats(), CacheStats::default());
}

#[test]
fn test_failed_builds_are_not_cached() {
    let mut cache = PlanCache::default();
    let v = iota(TensorStructure::asymmetric(vec![spacetime(Lo)]), 1.0, |x| x);

    let err = cache.evaluate(&[ti::b], &v.ix(&[ti::a])).unwrap_err();
    assert!(matches!(err, ExprError::OutputMismatch { .. }));
    assert!(cache.is_empty());
    assert_eq!(cache.stats().misses, 1);
}
