//! Null memory provider
//!
//! Reports success for every operation without ever producing usable memory.
//! Useful as a benchmark stub and for exercising provider plumbing where the
//! returned pointers are never dereferenced.

use std::ptr::NonNull;

use super::MemoryProvider;
use crate::error::MemoryResult;

const NULL_MESSAGE: &str = "null provider";

/// No-op provider
///
/// `alloc` succeeds with a dangling pointer aligned to the request; the
/// pointer must never be read or written. `free` accepts anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProvider;

impl NullProvider {
    /// Creates a new null provider
    pub const fn new() -> Self {
        NullProvider
    }
}

impl MemoryProvider for NullProvider {
    fn alloc(&self, _size: usize, alignment: usize) -> MemoryResult<NonNull<u8>> {
        let align = alignment.max(1).next_power_of_two();
        // A dangling but well-aligned address; never dereferenced by contract.
        Ok(NonNull::new(align as *mut u8).unwrap_or(NonNull::dangling()))
    }

    fn free(&self, _ptr: NonNull<u8>, _size: usize) -> MemoryResult<()> {
        Ok(())
    }

    fn last_result(&self) -> String {
        NULL_MESSAGE.to_string()
    }
}
