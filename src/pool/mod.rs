//! Disjoint pool: a bucketed slab allocator over a memory provider
//!
//! The pool keeps power-of-two size-class buckets; each bucket owns slabs
//! carved into fixed-size chunks. A request that fits an existing free chunk
//! never reaches the provider. Slab creation is bounded per bucket by
//! `capacity` and globally by the shared [`PoolLimits`] budget; once either
//! bound is hit the pool degrades to unpooled provider allocations instead of
//! failing. Requests above `max_poolable_size` bypass the pool entirely.
//!
//! Freeing recovers the owning slab through an explicit address-keyed
//! allocation record, so providers only ever see the `(ptr, size)` pairs they
//! produced.

mod bucket;
mod stats;

use std::collections::BTreeMap;
use std::ptr::{self, NonNull};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::{DisjointPoolConfig, PoolLimits};
use crate::error::{MemoryError, MemoryResult};
use crate::provider::MemoryProvider;
use crate::utils::{align_up, next_power_of_two};

pub use stats::PoolStats;
use bucket::Bucket;
use stats::AtomicPoolStats;

/// Alignment chunks provide without over-allocation
const NATURAL_ALIGNMENT: usize = 8;
/// Alignment hint passed to the provider for slab allocations
const SLAB_ALIGNMENT: usize = 4096;

/// How an outstanding pointer is tracked
#[derive(Debug, Clone, Copy)]
enum AllocRecord {
    /// Chunk handed out of a bucket's slab
    Pooled { bucket: usize, chunk: usize },
    /// Provider allocation that bypassed the buckets (oversized request or
    /// pool exhausted)
    Direct { base: usize, size: usize },
}

/// Bucketed slab allocator layered over a [`MemoryProvider`]
///
/// # Thread Safety
/// `malloc`/`free` may be called concurrently: buckets are individually
/// locked, the allocation record has its own lock (never held together with a
/// bucket lock), and budget accounting is atomic.
#[derive(Debug)]
pub struct DisjointPool<P: MemoryProvider> {
    provider: Arc<P>,
    config: DisjointPoolConfig,
    buckets: Vec<Mutex<Bucket>>,
    /// Smallest bucket chunk size (power of two)
    min_chunk: usize,
    records: Mutex<BTreeMap<usize, AllocRecord>>,
    stats: AtomicPoolStats,
}

impl<P: MemoryProvider> DisjointPool<P> {
    /// Creates a pool over `provider` with the given configuration
    ///
    /// The provider must outlive every pool built on it, which the shared
    /// `Arc` enforces. With `max_poolable_size == 0` no buckets exist and
    /// every request goes straight to the provider.
    pub fn new(provider: Arc<P>, config: DisjointPoolConfig) -> Self {
        let min_chunk = next_power_of_two(config.min_bucket_size.max(NATURAL_ALIGNMENT));
        let mut buckets = Vec::new();
        if config.max_poolable_size > 0 {
            let top = next_power_of_two(config.max_poolable_size).max(min_chunk);
            let mut chunk_size = min_chunk;
            loop {
                buckets.push(Mutex::new(Bucket::new(chunk_size, config.slab_min_size)));
                if chunk_size >= top {
                    break;
                }
                chunk_size *= 2;
            }
        }
        Self {
            provider,
            config,
            buckets,
            min_chunk,
            records: Mutex::new(BTreeMap::new()),
            stats: AtomicPoolStats::default(),
        }
    }

    /// The pool's configuration
    pub fn config(&self) -> &DisjointPoolConfig {
        &self.config
    }

    /// The shared budget this pool allocates against
    pub fn limits(&self) -> &Arc<PoolLimits> {
        &self.config.limits
    }

    /// Bytes currently pooled against the shared budget
    pub fn pooled_bytes(&self) -> usize {
        self.config.limits.pooled_bytes()
    }

    /// Free chunks currently available across all buckets
    pub fn free_chunks(&self) -> usize {
        self.buckets.iter().map(|b| b.lock().free_chunks()).sum()
    }

    /// Snapshot of the pool's activity counters
    pub fn stats(&self) -> PoolStats {
        self.stats.snapshot()
    }

    /// Surfaces the provider's most recent diagnostic message unmodified
    pub fn last_result(&self) -> String {
        self.provider.last_result()
    }

    /// Allocates `size` bytes with natural alignment
    ///
    /// A zero `size` yields a null pointer without touching any pool state.
    /// Pool exhaustion is not an error; only provider failure is.
    pub fn malloc(&self, size: usize) -> MemoryResult<*mut u8> {
        self.aligned_malloc(size, 1)
    }

    /// Allocates `size` bytes aligned to `alignment` (a power of two)
    ///
    /// Alignment above the natural chunk alignment is honored by
    /// over-allocating and offsetting within the chunk, identically on the
    /// pooled and bypass paths.
    pub fn aligned_malloc(&self, size: usize, alignment: usize) -> MemoryResult<*mut u8> {
        if size == 0 {
            return Ok(ptr::null_mut());
        }
        let alignment = alignment.max(1);
        if !alignment.is_power_of_two() {
            return Err(MemoryError::invalid_argument(format!(
                "alignment {alignment} is not a power of two"
            )));
        }
        let slack = if alignment > NATURAL_ALIGNMENT {
            alignment - 1
        } else {
            0
        };
        let request = size
            .checked_add(slack)
            .ok_or_else(|| MemoryError::invalid_argument("allocation size overflow"))?;

        if self.buckets.is_empty() || request > self.config.max_poolable_size {
            return self.allocate_direct(request, alignment);
        }

        let index = self.bucket_index(request);
        let chunk = {
            let mut bucket = self.buckets[index].lock();
            if let Some(chunk) = bucket.take_free_chunk() {
                self.stats.record_pool_hit();
                Some(chunk)
            } else if bucket.slab_count() < self.config.capacity
                && self.config.limits.try_reserve(bucket.slab_size())
            {
                // The provider call stays under the bucket-local lock so the
                // capacity check remains exact; other buckets are unaffected.
                match self.provider.alloc(bucket.slab_size(), SLAB_ALIGNMENT) {
                    Ok(base) => {
                        self.stats.record_provider_allocation();
                        self.stats.record_slab_created();
                        trace!(
                            chunk_size = bucket.chunk_size(),
                            slab_size = bucket.slab_size(),
                            "slab created"
                        );
                        Some(bucket.add_slab(base.as_ptr() as usize))
                    }
                    Err(error) => {
                        self.config.limits.release(bucket.slab_size());
                        debug!(%error, "slab allocation failed, degrading to direct");
                        None
                    }
                }
            } else {
                None
            }
        };

        match chunk {
            Some(chunk) => {
                let user = align_up(chunk, alignment);
                self.records
                    .lock()
                    .insert(user, AllocRecord::Pooled { bucket: index, chunk });
                self.stats.record_allocation();
                Ok(user as *mut u8)
            }
            // Capacity, budget or the provider refused a slab: degrade to an
            // unpooled allocation rather than failing.
            None => self.allocate_direct(request, alignment),
        }
    }

    /// Releases a pointer previously returned by this pool
    ///
    /// A null pointer is a no-op. Slabs going idle while the bucket is over
    /// capacity or the shared budget is exceeded are returned to the
    /// provider.
    pub fn free(&self, ptr: *mut u8) -> MemoryResult<()> {
        if ptr.is_null() {
            return Ok(());
        }
        let record = self.records.lock().remove(&(ptr as usize));
        let Some(record) = record else {
            return Err(MemoryError::invalid_argument(format!(
                "pointer {ptr:p} was not allocated by this pool"
            )));
        };
        match record {
            AllocRecord::Direct { base, size } => {
                if let Some(base) = NonNull::new(base as *mut u8) {
                    self.provider.free(base, size)?;
                }
            }
            AllocRecord::Pooled { bucket, chunk } => {
                let mut guard = self.buckets[bucket].lock();
                let slab_idle = guard.return_chunk(chunk);
                let over_capacity = guard.slab_count() > self.config.capacity;
                let over_budget =
                    self.config.limits.pooled_bytes() > self.config.limits.max_size;
                if slab_idle && (over_capacity || over_budget) {
                    if let Some((base, size)) = guard.release_idle_slab() {
                        drop(guard);
                        if let Some(base) = NonNull::new(base as *mut u8) {
                            self.provider.free(base, size)?;
                        }
                        self.config.limits.release(size);
                        self.stats.record_slab_released();
                        trace!(slab_size = size, "idle slab released");
                    }
                }
            }
        }
        self.stats.record_free();
        Ok(())
    }

    fn allocate_direct(&self, request: usize, alignment: usize) -> MemoryResult<*mut u8> {
        let base = self.provider.alloc(request, alignment)?;
        self.stats.record_provider_allocation();
        let base_addr = base.as_ptr() as usize;
        let user = align_up(base_addr, alignment);
        self.records
            .lock()
            .insert(user, AllocRecord::Direct { base: base_addr, size: request });
        self.stats.record_allocation();
        Ok(user as *mut u8)
    }

    /// Index of the smallest bucket whose chunks fit `request`
    fn bucket_index(&self, request: usize) -> usize {
        let class = next_power_of_two(request.max(self.min_chunk));
        (class.trailing_zeros() - self.min_chunk.trailing_zeros()) as usize
    }
}

impl<P: MemoryProvider> Drop for DisjointPool<P> {
    fn drop(&mut self) {
        let mut in_use = 0usize;
        for bucket in &self.buckets {
            let mut bucket = bucket.lock();
            for (base, size, used) in bucket.drain_slabs() {
                in_use += used;
                if let Some(base) = NonNull::new(base as *mut u8) {
                    if let Err(error) = self.provider.free(base, size) {
                        warn!(%error, "slab release failed during pool teardown");
                    }
                }
                self.config.limits.release(size);
            }
        }
        let records = std::mem::take(self.records.get_mut());
        for record in records.into_values() {
            if let AllocRecord::Direct { base, size } = record {
                in_use += 1;
                if let Some(base) = NonNull::new(base as *mut u8) {
                    if let Err(error) = self.provider.free(base, size) {
                        warn!(%error, "direct allocation release failed during pool teardown");
                    }
                }
            }
        }
        if in_use > 0 {
            warn!(in_use, "pool dropped with chunks still in use");
        }
    }
}
