//! Tracing provider decorator
//!
//! Wraps an upstream provider and invokes a caller-supplied callback with an
//! event tag before delegating each operation. The delegated outcome is
//! returned untouched, so tracing never alters success/failure semantics.

use std::fmt;
use std::ptr::NonNull;

use super::MemoryProvider;
use crate::error::MemoryResult;

/// Callback invoked with the event tag of each traced operation
pub type TraceFn = dyn Fn(&str) + Send + Sync;

/// Provider decorator that reports every operation to a trace callback
///
/// Event tags are `"alloc"`, `"free"` and `"get_last_result"`.
pub struct TraceProvider<P> {
    inner: P,
    trace: Box<TraceFn>,
}

impl<P> TraceProvider<P> {
    /// Creates a tracing decorator around `inner`
    pub fn new(inner: P, trace: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self { inner, trace: Box::new(trace) }
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

impl<P: fmt::Debug> fmt::Debug for TraceProvider<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceProvider")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<P: MemoryProvider> MemoryProvider for TraceProvider<P> {
    fn alloc(&self, size: usize, alignment: usize) -> MemoryResult<NonNull<u8>> {
        (self.trace)("alloc");
        self.inner.alloc(size, alignment)
    }

    fn free(&self, ptr: NonNull<u8>, size: usize) -> MemoryResult<()> {
        (self.trace)("free");
        self.inner.free(ptr, size)
    }

    fn last_result(&self) -> String {
        (self.trace)("get_last_result");
        self.inner.last_result()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::provider::MallocProvider;

    #[test]
    fn events_fire_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let provider = TraceProvider::new(MallocProvider::new(), move |tag: &str| {
            sink.lock().unwrap().push(tag.to_string());
        });

        let ptr = provider.alloc(32, 8).unwrap();
        provider.free(ptr, 32).unwrap();
        let _ = provider.last_result();

        assert_eq!(
            events.lock().unwrap().as_slice(),
            ["alloc", "free", "get_last_result"]
        );
    }

    #[test]
    fn delegated_semantics_are_preserved() {
        let provider = TraceProvider::new(MallocProvider::new(), |_| {});

        let err = provider.alloc(usize::MAX / 2, 8).unwrap_err();
        assert!(err.is_out_of_memory());

        let ptr = provider.alloc(16, 8).unwrap();
        provider.free(ptr, 16).unwrap();
    }
}
