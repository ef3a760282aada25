//! Error types shared by providers and pools

/// Result type for provider and pool operations
pub type MemoryResult<T> = std::result::Result<T, MemoryError>;

/// Memory operation errors
///
/// Pool exhaustion is deliberately absent: running out of pooled capacity or
/// budget degrades to an unpooled provider allocation and is not an error.
/// Only a genuine provider failure surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// The underlying memory source could not satisfy the allocation
    #[error("out of host memory: requested {requested} bytes")]
    OutOfHostMemory {
        /// Size of the failed request in bytes
        requested: usize,
    },

    /// A caller-supplied argument was rejected
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Why the argument was rejected
        reason: String,
    },

    /// Opaque upstream provider failure, propagated verbatim
    #[error("provider error: {message}")]
    Provider {
        /// Diagnostic message from the provider
        message: String,
    },
}

impl MemoryError {
    /// Create an out-of-host-memory error
    pub fn out_of_host_memory(requested: usize) -> Self {
        Self::OutOfHostMemory { requested }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument { reason: reason.into() }
    }

    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider { message: message.into() }
    }

    /// Whether this error reports memory exhaustion
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfHostMemory { .. })
    }
}
