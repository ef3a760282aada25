//! Pool configuration: descriptors, limits, defaults and the string parser
//!
//! The configuration surface is a single operator-supplied string (usually an
//! environment variable) of the shape
//!
//! ```text
//! EnabledFlag;GlobalMaxSize;kind:MaxPoolableSize,Capacity,SlabMinSize[;kind:...]
//! ```
//!
//! with `kind` one of `host`, `device`, `shared`, `read_only_shared` and size
//! specs accepting a case-insensitive `k`/`m` suffix. Parsing never fails:
//! invalid input degrades to built-in defaults so a malformed operator string
//! can never disable the allocator. Every descriptor always receives an entry
//! and all entries from one parse share a single [`PoolLimits`] budget.

use std::collections::HashMap;
use std::collections::hash_map;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;

/// Budget used when the global max-size field is absent or malformed
const DEFAULT_MAX_SIZE: usize = 16 * MIB;
/// Budget used when the global max-size field is present but empty
const EMPTY_FIELD_MAX_SIZE: usize = 32 * MIB;
/// Smallest bucket size class
const DEFAULT_MIN_BUCKET_SIZE: usize = 8;

/// Kind of memory a pool serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryKind {
    /// Ordinary host memory
    Host,
    /// Device-local memory
    Device,
    /// Memory shared between host and device
    Shared,
}

/// Identifies a memory kind plus read-only flag for configuration lookup
///
/// Value identity: used as the key of a [`PoolConfigurations`] mapping, with
/// at most one configuration per descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolDescriptor {
    /// Memory kind served by the pool
    pub kind: MemoryKind,
    /// Whether allocations are read-only after initialization
    pub read_only: bool,
}

impl PoolDescriptor {
    /// Descriptor for the given kind, read-write
    pub const fn new(kind: MemoryKind) -> Self {
        Self { kind, read_only: false }
    }

    /// Host memory descriptor
    pub const fn host() -> Self {
        Self::new(MemoryKind::Host)
    }

    /// Device memory descriptor
    pub const fn device() -> Self {
        Self::new(MemoryKind::Device)
    }

    /// Shared memory descriptor
    pub const fn shared() -> Self {
        Self::new(MemoryKind::Shared)
    }

    /// Read-only shared memory descriptor
    pub const fn read_only_shared() -> Self {
        Self { kind: MemoryKind::Shared, read_only: true }
    }

    /// All descriptors that receive a configuration entry
    pub const fn all() -> [PoolDescriptor; 4] {
        [
            Self::host(),
            Self::device(),
            Self::shared(),
            Self::read_only_shared(),
        ]
    }
}

/// Global pooled-memory budget shared by every pool parsed from one string
///
/// `total_size` tracks the bytes currently held in slabs across all pools
/// linked to this limits object; reservation is a CAS so concurrent pools
/// never overshoot `max_size` together.
#[derive(Debug)]
pub struct PoolLimits {
    /// Upper bound on pooled bytes across all linked pools
    pub max_size: usize,
    total_size: AtomicUsize,
}

impl PoolLimits {
    /// Creates a shared limits object with the given budget
    pub fn new(max_size: usize) -> Arc<Self> {
        Arc::new(Self { max_size, total_size: AtomicUsize::new(0) })
    }

    /// Bytes currently pooled against this budget
    pub fn pooled_bytes(&self) -> usize {
        self.total_size.load(Ordering::Relaxed)
    }

    /// Attempts to reserve `bytes` against the budget
    pub(crate) fn try_reserve(&self, bytes: usize) -> bool {
        let mut current = self.total_size.load(Ordering::Relaxed);
        loop {
            let Some(next) = current.checked_add(bytes) else {
                return false;
            };
            if next > self.max_size {
                return false;
            }
            match self.total_size.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns `bytes` to the budget
    pub(crate) fn release(&self, bytes: usize) {
        self.total_size.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Configuration of one disjoint pool
#[derive(Debug, Clone)]
pub struct DisjointPoolConfig {
    /// Minimum size of a slab requested from the provider
    pub slab_min_size: usize,
    /// Largest request served from the pool; larger requests bypass it
    pub max_poolable_size: usize,
    /// Maximum number of slabs a bucket keeps pooled
    pub capacity: usize,
    /// Smallest bucket size class
    pub min_bucket_size: usize,
    /// Shared global budget
    pub limits: Arc<PoolLimits>,
}

impl DisjointPoolConfig {
    /// Built-in defaults for a descriptor, linked to the given budget
    ///
    /// Host and device favor small slabs with moderate pooling; shared
    /// memory pools nothing by default, and read-only shared pools
    /// aggressively with large slabs.
    pub fn default_for(descriptor: PoolDescriptor, limits: Arc<PoolLimits>) -> Self {
        let (max_poolable_size, capacity, slab_min_size) = match descriptor {
            PoolDescriptor { kind: MemoryKind::Host, read_only: false } => (2 * MIB, 4, 64 * KIB),
            PoolDescriptor { kind: MemoryKind::Device, read_only: false } => (4 * MIB, 4, 64 * KIB),
            PoolDescriptor { kind: MemoryKind::Shared, read_only: false } => (0, 0, 2 * MIB),
            PoolDescriptor { read_only: true, .. } => (4 * MIB, 4, 2 * MIB),
        };
        Self {
            slab_min_size,
            max_poolable_size,
            capacity,
            min_bucket_size: DEFAULT_MIN_BUCKET_SIZE,
            limits,
        }
    }
}

/// Mapping from [`PoolDescriptor`] to [`DisjointPoolConfig`]
///
/// Produced by [`parse`](Self::parse); empty when pooling is disabled by the
/// leading flag, otherwise holds exactly one entry per descriptor.
#[derive(Debug, Clone)]
pub struct PoolConfigurations {
    entries: HashMap<PoolDescriptor, DisjointPoolConfig>,
}

impl PoolConfigurations {
    /// Parses an operator configuration string
    ///
    /// Never fails; see the module docs for the degradation rules.
    pub fn parse(input: &str) -> Self {
        let mut segments = input.split(';');

        // Leading enabled flag. Parsed as unsigned so "0" disables pooling
        // while a negative or non-numeric token fails the parse and leaves
        // pooling enabled. Documented quirk; callers rely on it.
        let flag = segments.next().unwrap_or("");
        match flag.trim().parse::<u64>() {
            Ok(0) => return Self { entries: HashMap::new() },
            Ok(_) => {}
            Err(_) => {
                if !flag.trim().is_empty() {
                    debug!(segment = flag, "unparsable enabled flag, pooling stays enabled");
                }
            }
        }

        let max_size = match segments.next() {
            None => DEFAULT_MAX_SIZE,
            Some(field) if field.trim().is_empty() => EMPTY_FIELD_MAX_SIZE,
            Some(field) => parse_size(field).unwrap_or_else(|| {
                debug!(segment = field, "malformed global max size, using default");
                DEFAULT_MAX_SIZE
            }),
        };
        let limits = PoolLimits::new(max_size);

        let mut entries: HashMap<PoolDescriptor, DisjointPoolConfig> = PoolDescriptor::all()
            .into_iter()
            .map(|d| (d, DisjointPoolConfig::default_for(d, Arc::clone(&limits))))
            .collect();

        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((kind, fields)) = segment.split_once(':') else {
                warn!(segment, "configuration segment without kind, dropped");
                continue;
            };
            let descriptor = match kind.trim() {
                "host" => PoolDescriptor::host(),
                "device" => PoolDescriptor::device(),
                "shared" => PoolDescriptor::shared(),
                "read_only_shared" => PoolDescriptor::read_only_shared(),
                other => {
                    warn!(kind = other, "unknown memory kind, segment dropped");
                    continue;
                }
            };
            // Entry exists for every descriptor; fields override positionally.
            let Some(config) = entries.get_mut(&descriptor) else {
                continue;
            };
            for (index, field) in fields.split(',').enumerate() {
                match index {
                    0 => {
                        if let Some(value) = parse_size(field) {
                            config.max_poolable_size = value;
                        }
                    }
                    1 => {
                        if let Ok(value) = field.trim().parse::<usize>() {
                            config.capacity = value;
                        }
                    }
                    2 => {
                        if let Some(value) = parse_size(field) {
                            config.slab_min_size = value;
                        }
                    }
                    // Extra trailing fields are ignored.
                    _ => break,
                }
            }
        }

        Self { entries }
    }

    /// Reads the configuration from an environment variable
    ///
    /// An absent variable yields the built-in defaults.
    pub fn from_env(var: &str) -> Self {
        match std::env::var(var) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::default(),
        }
    }

    /// Configuration for a descriptor, if pooling is enabled
    pub fn get(&self, descriptor: &PoolDescriptor) -> Option<&DisjointPoolConfig> {
        self.entries.get(descriptor)
    }

    /// Number of configured descriptors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether pooling is disabled entirely
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over descriptor/configuration pairs
    pub fn iter(&self) -> hash_map::Iter<'_, PoolDescriptor, DisjointPoolConfig> {
        self.entries.iter()
    }
}

impl Default for PoolConfigurations {
    fn default() -> Self {
        Self::parse("")
    }
}

/// Parses a size spec: decimal digits with optional `k`/`K`/`m`/`M` suffix
fn parse_size(field: &str) -> Option<usize> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let (digits, multiplier) = match field.as_bytes()[field.len() - 1] {
        b'k' | b'K' => (&field[..field.len() - 1], KIB),
        b'm' | b'M' => (&field[..field.len() - 1], MIB),
        _ => (field, 1),
    };
    digits.parse::<usize>().ok()?.checked_mul(multiplier)
}
