//! Plan caching.
//!
//! Resolving an expression is independent of the values it holds, so plans
//! are keyed by expression shape and output and reused across evaluations
//! (e.g. once per grid element in a time step).

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::trace;

use crate::error::Result;
use crate::tensor::{Component, Tensor, TensorStructure};

use super::plan::Plan;
use super::token::IndexToken;
use super::tree::{Expr, Shape};

/// Default number of cached plans retained before LRU eviction.
pub const DEFAULT_PLAN_CACHE_CAPACITY: usize = 64;

const DEFAULT_CAPACITY: NonZeroUsize =
    NonZeroUsize::new(DEFAULT_PLAN_CACHE_CAPACITY).expect("plan cache capacity is non-zero");

/// Plan cache configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of retained plans
    pub capacity: NonZeroUsize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Cache key: expression shape, output tokens and, for in-place
/// evaluation, the target structure.
///
/// Keys are only built next to the plan they index, from the same inputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PlanKey {
    shape: Shape,
    output: Vec<IndexToken>,
    target: Option<TensorStructure>,
}

impl PlanKey {
    fn for_output<T: Component>(expr: &Expr<'_, T>, output: &[IndexToken]) -> Self {
        Self {
            shape: expr.shape(),
            output: output.to_vec(),
            target: None,
        }
    }

    fn for_target<T: Component>(
        expr: &Expr<'_, T>,
        output: &[IndexToken],
        target: &TensorStructure,
    ) -> Self {
        Self {
            shape: expr.shape(),
            output: output.to_vec(),
            target: Some(target.clone()),
        }
    }
}

/// Hit/miss counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU cache of evaluation plans, owned by the caller.
pub struct PlanCache {
    plans: LruCache<PlanKey, Arc<Plan>>,
    stats: CacheStats,
}

impl Default for PlanCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl PlanCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            plans: LruCache::new(config.capacity),
            stats: CacheStats::default(),
        }
    }

    /// Cached plan for `key`, building it with `build` on a miss.
    ///
    /// Failed builds are not cached.
    fn get_or_build(
        &mut self,
        key: PlanKey,
        build: impl FnOnce() -> Result<Plan>,
    ) -> Result<Arc<Plan>> {
        if let Some(plan) = self.plans.get(&key) {
            self.stats.hits += 1;
            trace!(hits = self.stats.hits, "plan cache hit");
            return Ok(Arc::clone(plan));
        }
        self.stats.misses += 1;
        trace!(misses = self.stats.misses, "plan cache miss");
        let plan = Arc::new(build()?);
        self.plans.put(key, Arc::clone(&plan));
        Ok(plan)
    }

    /// Like [`crate::evaluate`], reusing the plan of an earlier call with the same shape
    pub fn evaluate<T: Component>(
        &mut self,
        output: &[IndexToken],
        expr: &Expr<'_, T>,
    ) -> Result<Tensor<T>> {
        let key = PlanKey::for_output(expr, output);
        let plan = self.get_or_build(key, || Plan::for_output(expr, output))?;
        plan.execute_new(expr)
    }

    /// Like [`crate::evaluate_into`], reusing cached plans
    pub fn evaluate_into<T: Component>(
        &mut self,
        target: &mut Tensor<T>,
        output: &[IndexToken],
        expr: &Expr<'_, T>,
    ) -> Result<()> {
        let structure = target.structure();
        let key = PlanKey::for_target(expr, output, structure);
        let plan = self.get_or_build(key, || Plan::for_target(expr, output, structure))?;
        plan.execute_into(target, expr)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn clear(&mut self) {
        self.plans.clear();
        self.stats = CacheStats::default();
    }
}
