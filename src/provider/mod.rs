//! Raw memory providers
//!
//! A [`MemoryProvider`] is the capability set over an opaque raw allocation
//! source: every call may reach the underlying memory, no pooling happens at
//! this layer. Pools layer on top to reduce provider round-trips.
//!
//! Implementations:
//! - [`MallocProvider`]: system allocation via `libc`
//! - [`NullProvider`]: no-op stub that never produces usable memory
//! - [`TraceProvider`]: decorator invoking a callback around every operation
//! - [`MockProvider`]: transparent forwarding decorator carrying injected
//!   pool parameters for tests

mod malloc;
mod mock;
mod null;
mod trace;

use std::ptr::NonNull;
use std::sync::Arc;

use crate::error::MemoryResult;

pub use malloc::MallocProvider;
pub use mock::MockProvider;
pub use null::NullProvider;
pub use trace::TraceProvider;

/// Capability set of a raw memory source
///
/// Lifecycle is RAII: a provider owns whatever parameter block it was
/// created with and releases it exactly once when dropped.
///
/// # Contract
/// - Returned pointers are exclusive until passed back to [`free`](Self::free)
///   with the size used for the allocation.
/// - Implementations must be reentrant: several pools and threads may share
///   one provider handle.
/// - Pointers are expected to carry at least word alignment; stricter
///   alignment requests may be ignored (the pool over-allocates and offsets
///   when it needs more).
pub trait MemoryProvider: Send + Sync {
    /// Allocates `size` bytes from the underlying source
    ///
    /// `alignment` is a hint; see the trait-level contract.
    fn alloc(&self, size: usize, alignment: usize) -> MemoryResult<NonNull<u8>>;

    /// Returns an allocation of `size` bytes at `ptr` to the source
    fn free(&self, ptr: NonNull<u8>, size: usize) -> MemoryResult<()>;

    /// Surfaces the most recent provider-level diagnostic message
    fn last_result(&self) -> String;
}

impl<P: MemoryProvider + ?Sized> MemoryProvider for &P {
    fn alloc(&self, size: usize, alignment: usize) -> MemoryResult<NonNull<u8>> {
        (**self).alloc(size, alignment)
    }

    fn free(&self, ptr: NonNull<u8>, size: usize) -> MemoryResult<()> {
        (**self).free(ptr, size)
    }

    fn last_result(&self) -> String {
        (**self).last_result()
    }
}

impl<P: MemoryProvider + ?Sized> MemoryProvider for Arc<P> {
    fn alloc(&self, size: usize, alignment: usize) -> MemoryResult<NonNull<u8>> {
        (**self).alloc(size, alignment)
    }

    fn free(&self, ptr: NonNull<u8>, size: usize) -> MemoryResult<()> {
        (**self).free(ptr, size)
    }

    fn last_result(&self) -> String {
        (**self).last_result()
    }
}
