//! Monotonic event-id allocation.
//!
//! spec.md asks for a process-wide counter with no id reuse. Rather than a
//! bare global, it is wrapped in a small allocator object that a
//! `Document` owns (or that a host can share across documents via
//! `reserve`), per spec.md §9's recommended re-architecture.

use std::sync::atomic::{AtomicU64, Ordering};

/// Allocates strictly increasing, process-unique event ids.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Start a fresh allocator at `1` (`0` is reserved as "unassigned").
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next id.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Reserve a contiguous block of `n` ids and return the first one.
    pub fn reserve(&self, n: u64) -> u64 {
        self.next.fetch_add(n.max(1), Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide default allocator used by `Document::new`.
static DEFAULT_ALLOCATOR: IdAllocator = IdAllocator::new();

/// Allocate an id from the process-wide default allocator.
pub fn next_default_id() -> u64 {
    DEFAULT_ALLOCATOR.next()
}
