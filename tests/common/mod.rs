//! Shared helpers for pool integration tests

use std::sync::Arc;

use disjoint_pool::pool::DisjointPool;
use disjoint_pool::provider::MemoryProvider;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Drives a pool with randomly sized allocations and frees, verifying that
/// memory handed out stays writable and unclobbered while held.
pub struct RandomSizesAllocator<'a, P: MemoryProvider> {
    pool: &'a DisjointPool<P>,
    rng: StdRng,
    max_size: usize,
    live: Vec<(*mut u8, usize, u8)>,
}

impl<'a, P: MemoryProvider> RandomSizesAllocator<'a, P> {
    pub fn new(pool: &'a DisjointPool<P>, max_size: usize, seed: u64) -> Self {
        Self {
            pool,
            rng: StdRng::seed_from_u64(seed),
            max_size,
            live: Vec::new(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Allocates a random size and stamps the first and last bytes
    pub fn alloc_random(&mut self) {
        let size = self.rng.random_range(1..=self.max_size);
        let fill = self.rng.random::<u8>();
        let ptr = self.pool.malloc(size).expect("allocation failed");
        assert!(!ptr.is_null());
        unsafe {
            ptr.write(fill);
            ptr.add(size - 1).write(fill);
        }
        self.live.push((ptr, size, fill));
    }

    /// Frees a random live allocation, checking its stamp first
    pub fn free_random(&mut self) {
        if self.live.is_empty() {
            return;
        }
        let index = self.rng.random_range(0..self.live.len());
        let (ptr, size, fill) = self.live.swap_remove(index);
        unsafe {
            assert_eq!(ptr.read(), fill, "allocation clobbered");
            assert_eq!(ptr.add(size - 1).read(), fill, "allocation clobbered");
        }
        self.pool.free(ptr).expect("free failed");
    }

    /// Frees everything still live
    pub fn drain(&mut self) {
        while !self.live.is_empty() {
            self.free_random();
        }
    }
}

/// RAII allocation: frees the pointer when the scope ends
pub struct ScopedAlloc<P: MemoryProvider> {
    pool: Arc<DisjointPool<P>>,
    ptr: *mut u8,
}

impl<P: MemoryProvider> ScopedAlloc<P> {
    pub fn new(pool: Arc<DisjointPool<P>>, size: usize) -> Self {
        let ptr = pool.malloc(size).expect("allocation failed");
        Self { pool, ptr }
    }

    pub fn ptr(&self) -> *mut u8 {
        self.ptr
    }
}

impl<P: MemoryProvider> Drop for ScopedAlloc<P> {
    fn drop(&mut self) {
        self.pool.free(self.ptr).expect("free failed");
    }
}
