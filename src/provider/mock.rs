//! Mock forwarding provider
//!
//! Transparently forwards every operation to an upstream provider while
//! carrying a [`DisjointPoolConfig`] parameter block. Tests use it to inject
//! a provider preconfigured with arbitrary pool parameters.

use std::ptr::NonNull;

use super::MemoryProvider;
use crate::config::DisjointPoolConfig;
use crate::error::MemoryResult;

/// Forwarding decorator that owns injected pool parameters
#[derive(Debug)]
pub struct MockProvider<P> {
    inner: P,
    config: DisjointPoolConfig,
}

impl<P> MockProvider<P> {
    /// Creates a forwarding decorator around `inner` with the given parameters
    pub fn new(inner: P, config: DisjointPoolConfig) -> Self {
        Self { inner, config }
    }

    /// The injected pool parameters
    pub fn pool_config(&self) -> &DisjointPoolConfig {
        &self.config
    }

    /// Gets a reference to the wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Consumes the decorator and returns the wrapped provider
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: MemoryProvider> MemoryProvider for MockProvider<P> {
    fn alloc(&self, size: usize, alignment: usize) -> MemoryResult<NonNull<u8>> {
        self.inner.alloc(size, alignment)
    }

    fn free(&self, ptr: NonNull<u8>, size: usize) -> MemoryResult<()> {
        self.inner.free(ptr, size)
    }

    fn last_result(&self) -> String {
        self.inner.last_result()
    }
}
