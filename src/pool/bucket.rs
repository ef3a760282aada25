//! Buckets and slabs
//!
//! A bucket is one size class of the pool: it owns slabs (single provider
//! allocations subdivided into fixed-size chunks) and hands chunks out of the
//! slabs' free lists. Slab memory is tracked by address only; the bucket never
//! reads or writes through the chunks it manages.

/// One provider allocation subdivided into fixed-size chunks
#[derive(Debug)]
pub(crate) struct Slab {
    base: usize,
    slab_size: usize,
    chunk_size: usize,
    /// Chunks currently handed out
    used: usize,
    /// Addresses of chunks available for reuse
    free: Vec<usize>,
}

impl Slab {
    fn new(base: usize, slab_size: usize, chunk_size: usize) -> Self {
        let chunk_count = slab_size / chunk_size;
        // Reversed so the lowest address is handed out first.
        let free = (0..chunk_count)
            .rev()
            .map(|i| base + i * chunk_size)
            .collect();
        Self { base, slab_size, chunk_size, used: 0, free }
    }

    fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr < self.base + self.slab_size
    }

    fn take_chunk(&mut self) -> Option<usize> {
        let chunk = self.free.pop()?;
        self.used += 1;
        Some(chunk)
    }

    fn put_chunk(&mut self, chunk: usize) {
        debug_assert!(self.contains(chunk));
        debug_assert_eq!((chunk - self.base) % self.chunk_size, 0);
        self.free.push(chunk);
        self.used -= 1;
    }

    fn is_idle(&self) -> bool {
        self.used == 0
    }
}

/// A size class: slabs of one chunk size plus their free chunks
#[derive(Debug)]
pub(crate) struct Bucket {
    chunk_size: usize,
    slab_size: usize,
    slabs: Vec<Slab>,
}

impl Bucket {
    /// Creates an empty bucket for `chunk_size`
    ///
    /// Slabs are at least `slab_min_size`, grown to the chunk size when a
    /// single chunk would not fit.
    pub(crate) fn new(chunk_size: usize, slab_min_size: usize) -> Self {
        Self {
            chunk_size,
            slab_size: slab_min_size.max(chunk_size),
            slabs: Vec::new(),
        }
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn slab_size(&self) -> usize {
        self.slab_size
    }

    pub(crate) fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Total free chunks across all slabs
    pub(crate) fn free_chunks(&self) -> usize {
        self.slabs.iter().map(|s| s.free.len()).sum()
    }

    /// Pops a free chunk from any slab (a pool hit)
    pub(crate) fn take_free_chunk(&mut self) -> Option<usize> {
        self.slabs.iter_mut().find_map(Slab::take_chunk)
    }

    /// Adopts a freshly provider-allocated slab and carves its first chunk
    pub(crate) fn add_slab(&mut self, base: usize) -> usize {
        let mut slab = Slab::new(base, self.slab_size, self.chunk_size);
        // slab_size >= chunk_size, so at least one chunk exists
        let chunk = slab.take_chunk().unwrap_or(base);
        self.slabs.push(slab);
        chunk
    }

    /// Returns a chunk to its owning slab
    ///
    /// Returns `true` when the owning slab has no chunks in use afterwards.
    pub(crate) fn return_chunk(&mut self, chunk: usize) -> bool {
        match self.slabs.iter_mut().find(|s| s.contains(chunk)) {
            Some(slab) => {
                slab.put_chunk(chunk);
                slab.is_idle()
            }
            None => {
                debug_assert!(false, "chunk does not belong to this bucket");
                false
            }
        }
    }

    /// Removes one idle slab, yielding its base address and size
    pub(crate) fn release_idle_slab(&mut self) -> Option<(usize, usize)> {
        let index = self.slabs.iter().position(Slab::is_idle)?;
        let slab = self.slabs.swap_remove(index);
        Some((slab.base, slab.slab_size))
    }

    /// Removes every slab for teardown, yielding `(base, size, chunks in use)`
    pub(crate) fn drain_slabs(&mut self) -> Vec<(usize, usize, usize)> {
        self.slabs
            .drain(..)
            .map(|s| (s.base, s.slab_size, s.used))
            .collect()
    }
}
