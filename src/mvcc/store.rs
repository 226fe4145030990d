//! Store - the shared state behind every transaction
//!
//! Owns the key-to-chain table, the lock manager and the id allocator
//! as explicit instance state, so independent stores coexist (one per
//! test, typically) instead of sharing ambient globals.
//!
//! The store holds no lock of its own beyond what the lock manager
//! provides per key; the chain table sits behind a short critical
//! section that is never held across an await point.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use crate::lock::LockManager;
use crate::observability::{Event, Logger};
use crate::txn_id::TxnIdAllocator;

use super::transaction::Transaction;
use super::version_chain::VersionChain;

pub(super) struct StoreShared {
    pub(super) chains: StdMutex<HashMap<String, VersionChain>>,
    pub(super) locks: LockManager,
    pub(super) txn_ids: TxnIdAllocator,
}

/// An in-memory transactional key-value store with snapshot-style read
/// isolation.
///
/// Cheap to clone; clones share the same data. All data is lost on
/// process exit: no durability, no recovery, by design.
#[derive(Clone)]
pub struct Store {
    shared: Arc<StoreShared>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(StoreShared {
                chains: StdMutex::new(HashMap::new()),
                locks: LockManager::new(),
                txn_ids: TxnIdAllocator::new(),
            }),
        }
    }

    /// Begins a transaction, drawing a fresh id.
    pub fn begin(&self) -> Transaction {
        let id = self.shared.txn_ids.next_id();
        Logger::trace(Event::TxnBegin.as_str(), &[("txn", &id.to_string())]);
        Transaction::new(id, Arc::clone(&self.shared))
    }

    /// Snapshot clone of a key's version chain, committed or not.
    ///
    /// Diagnostic/test surface; visibility is not applied.
    pub fn chain(&self, key: &str) -> Option<VersionChain> {
        self.shared.chains.lock().unwrap().get(key).cloned()
    }

    /// The lock manager backing this store, for diagnostics.
    pub fn lock_manager(&self) -> &LockManager {
        &self.shared.locks
    }

    /// Wipes chains, locks and the id counter.
    ///
    /// Test-only reset; never reachable from production call paths.
    /// Transactions begun before the reset must not be used afterward.
    pub fn reset(&self) {
        self.shared.chains.lock().unwrap().clear();
        self.shared.locks.clear_all();
        self.shared.txn_ids.reset();
        Logger::info(Event::StoreReset.as_str(), &[]);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("keys", &self.shared.chains.lock().unwrap().len())
            .finish()
    }
}
