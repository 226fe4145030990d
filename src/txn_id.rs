//! TxnId - Totally ordered transaction identity
//!
//! Per ISOLATION.md §2:
//! - Totally orders every begin and commit event in the process
//! - Begin and commit both consume a draw from ONE shared counter,
//!   so begin-ids and commit-ids interleave in a single global order
//! - No two draws share the same identity
//!
//! `TxnId` is a pure type with no behavior beyond construction and
//! access. `TxnIdAllocator` is the only production source of fresh ids.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A totally ordered transaction identity.
///
/// Per ISOLATION.md §2, this single ordering is the sole authority for
/// visibility: a commit stamped with a larger id than a reader's own id
/// is invisible to that reader, unconditionally.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TxnId(u64);

impl TxnId {
    /// Creates a TxnId with the given value.
    ///
    /// Production code draws ids from `TxnIdAllocator`; explicit
    /// construction exists for tests and diagnostics.
    #[inline]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates strictly increasing, duplicate-free transaction ids.
///
/// Duplicate or out-of-order ids would silently corrupt visibility,
/// since both transaction identity and commit ordering depend on this
/// sequence. Allocation is a single atomic fetch-add.
///
/// No overflow handling and no persistence across restarts; the counter
/// lives for the process and is reset only by the test-only `reset`.
#[derive(Debug)]
pub struct TxnIdAllocator {
    next: AtomicU64,
}

impl TxnIdAllocator {
    /// Creates an allocator whose first draw is id 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns a fresh id, one greater than the previous draw.
    ///
    /// Safe under concurrent invocation.
    pub fn next_id(&self) -> TxnId {
        TxnId::new(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Rewinds the counter to its initial state.
    ///
    /// Test-only. Never call this from a production path: ids handed
    /// out earlier stop being unique the moment the counter rewinds.
    pub fn reset(&self) {
        self.next.store(1, Ordering::SeqCst);
    }
}

impl Default for TxnIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_first_draw_is_one() {
        let alloc = TxnIdAllocator::new();
        assert_eq!(alloc.next_id(), TxnId::new(1));
    }

    #[test]
    fn test_draws_strictly_increase() {
        let alloc = TxnIdAllocator::new();
        let a = alloc.next_id();
        let b = alloc.next_id();
        let c = alloc.next_id();
        assert!(a < b);
        assert!(b < c);
        assert_eq!(c.value(), 3);
    }

    #[test]
    fn test_reset_rewinds_counter() {
        let alloc = TxnIdAllocator::new();
        alloc.next_id();
        alloc.next_id();
        alloc.reset();
        assert_eq!(alloc.next_id(), TxnId::new(1));
    }

    #[test]
    fn test_concurrent_draws_are_unique() {
        let alloc = Arc::new(TxnIdAllocator::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let alloc = Arc::clone(&alloc);
            handles.push(std::thread::spawn(move || {
                (0..1000).map(|_| alloc.next_id()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8000);
    }

    #[test]
    fn test_txn_id_ordering_and_display() {
        let a = TxnId::new(10);
        let b = TxnId::new(20);
        assert!(a < b);
        assert_eq!(a.to_string(), "10");
    }
}
