//! Malloc-backed memory provider
//!
//! Forwards allocation to the system allocator through `libc`. The alignment
//! argument is deliberately ignored; callers needing stricter alignment
//! over-allocate and offset (the disjoint pool does exactly that).

use std::ptr::NonNull;

use parking_lot::Mutex;

use super::MemoryProvider;
use crate::error::{MemoryError, MemoryResult};

const SUCCESS_MESSAGE: &str = "success";

/// Provider backed by the system `malloc`/`free`
///
/// # Thread Safety
/// The system allocator handles concurrent allocation; the retained
/// diagnostic is guarded by a mutex, so the provider is freely shared.
#[derive(Debug)]
pub struct MallocProvider {
    last_result: Mutex<String>,
}

impl MallocProvider {
    /// Creates a new malloc-backed provider
    pub fn new() -> Self {
        Self {
            last_result: Mutex::new(SUCCESS_MESSAGE.to_string()),
        }
    }

    fn set_last_result(&self, message: String) {
        *self.last_result.lock() = message;
    }
}

impl Default for MallocProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider for MallocProvider {
    fn alloc(&self, size: usize, _alignment: usize) -> MemoryResult<NonNull<u8>> {
        // malloc(0) may legally return null; request one byte instead so a
        // null return always means exhaustion.
        let request = size.max(1);

        // SAFETY: malloc with a non-zero size has no preconditions; the
        // result is checked for null before use.
        let ptr = unsafe { libc::malloc(request) }.cast::<u8>();

        match NonNull::new(ptr) {
            Some(ptr) => {
                self.set_last_result(SUCCESS_MESSAGE.to_string());
                Ok(ptr)
            }
            None => {
                self.set_last_result(format!("malloc of {size} bytes failed"));
                Err(MemoryError::out_of_host_memory(size))
            }
        }
    }

    fn free(&self, ptr: NonNull<u8>, _size: usize) -> MemoryResult<()> {
        // SAFETY: ptr was returned by libc::malloc via alloc above and has
        // not been freed yet (provider contract).
        unsafe { libc::free(ptr.as_ptr().cast()) };
        Ok(())
    }

    fn last_result(&self) -> String {
        self.last_result.lock().clone()
    }
}
