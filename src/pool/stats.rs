//! Pool statistics

use std::sync::atomic::{AtomicUsize, Ordering};

/// Snapshot of pool activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful allocations served (pooled or direct)
    pub allocations: usize,
    /// Successful frees
    pub frees: usize,
    /// Allocations served from an existing free chunk (no provider call)
    pub pool_hits: usize,
    /// Calls that reached the provider (slabs and direct allocations)
    pub provider_allocations: usize,
    /// Slabs created over the pool's lifetime
    pub slabs_created: usize,
    /// Slabs returned to the provider before teardown
    pub slabs_released: usize,
}

#[derive(Debug, Default)]
pub(crate) struct AtomicPoolStats {
    allocations: AtomicUsize,
    frees: AtomicUsize,
    pool_hits: AtomicUsize,
    provider_allocations: AtomicUsize,
    slabs_created: AtomicUsize,
    slabs_released: AtomicUsize,
}

impl AtomicPoolStats {
    pub(crate) fn record_allocation(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_free(&self) {
        self.frees.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pool_hit(&self) {
        self.pool_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_provider_allocation(&self) {
        self.provider_allocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_slab_created(&self) {
        self.slabs_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_slab_released(&self) {
        self.slabs_released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PoolStats {
        PoolStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            pool_hits: self.pool_hits.load(Ordering::Relaxed),
            provider_allocations: self.provider_allocations.load(Ordering::Relaxed),
            slabs_created: self.slabs_created.load(Ordering::Relaxed),
            slabs_released: self.slabs_released.load(Ordering::Relaxed),
        }
    }
}
