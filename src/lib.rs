//! Pluggable memory allocation: providers and the disjoint pool
//!
//! This crate layers a bucketed slab allocator over swappable memory
//! sources, including:
//!
//! - The [`provider::MemoryProvider`] trait and ready-made implementations
//!   (malloc-backed, null, tracing, mock)
//! - [`pool::DisjointPool`], a thread-safe size-class pool with a shared
//!   global budget and graceful degradation to direct allocation
//! - [`config::PoolConfigurations`], a permissive operator-string parser
//!   producing per-memory-kind pool configurations
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use disjoint_pool::config::{PoolConfigurations, PoolDescriptor};
//! use disjoint_pool::pool::DisjointPool;
//! use disjoint_pool::provider::MallocProvider;
//!
//! fn main() -> disjoint_pool::error::MemoryResult<()> {
//!     let configs = PoolConfigurations::parse("1;32M;host:1M,4,64k");
//!     let config = configs
//!         .get(&PoolDescriptor::host())
//!         .expect("pooling enabled")
//!         .clone();
//!
//!     let pool = DisjointPool::new(Arc::new(MallocProvider::new()), config);
//!     let ptr = pool.malloc(128)?;
//!     pool.free(ptr)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pool;
pub mod provider;
pub mod utils;

pub use config::{DisjointPoolConfig, MemoryKind, PoolConfigurations, PoolDescriptor, PoolLimits};
pub use error::{MemoryError, MemoryResult};
pub use pool::{DisjointPool, PoolStats};
pub use provider::{MallocProvider, MemoryProvider, MockProvider, NullProvider, TraceProvider};
