//! LockManager - per-key lock arbitration across transactions
//!
//! Per LOCKING.md §2-§3:
//! - At most one lock record per (transaction, key)
//! - Sufficient existing holds are reused without blocking
//! - Shared holds escalate to Exclusive within one transaction
//! - Every full acquisition cycle probes the key's registered RwMutex,
//!   then installs a brand-new one; the mutex is never reused
//! - Releasing ONE handle wipes ALL of the owning transaction's lock
//!   records, while other keys' underlying RwMutex holds stay held
//!
//! The coarse release wipe assumes the store's usage: all of a
//! transaction's handles are released together at transaction end.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex as StdMutex};

use crate::observability::{Event, Logger};
use crate::txn_id::TxnId;

use super::errors::LockError;
use super::rw_mutex::{RwMutex, RwReleaseHandle};

/// Strength of a per-key lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Compatible with other shared holders; blocks exclusive.
    Shared,
    /// Blocks every other holder.
    Exclusive,
}

impl LockMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockMode::Shared => "shared",
            LockMode::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LockMode {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" => Ok(LockMode::Shared),
            "exclusive" => Ok(LockMode::Exclusive),
            other => Err(LockError::InvalidMode(other.to_string())),
        }
    }
}

/// One outstanding lock: who holds what, on which key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    txn_id: TxnId,
    key: String,
    mode: LockMode,
}

impl LockRecord {
    fn new(txn_id: TxnId, key: String, mode: LockMode) -> Self {
        Self { txn_id, key, mode }
    }

    #[inline]
    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

/// The underlying RwMutex hold for a record, shared between the
/// manager's bookkeeping and the caller's release handle. Escalation
/// takes the hold out from under the old handle; whoever takes it
/// first releases it, the other side finds the slot empty.
type HoldSlot = Arc<StdMutex<Option<RwReleaseHandle>>>;

struct HeldLock {
    record: LockRecord,
    hold: HoldSlot,
}

#[derive(Default)]
struct ManagerState {
    /// Outstanding records in acquisition order, at most one per
    /// (transaction, key).
    records: Vec<HeldLock>,
    /// The active RwMutex per key; replaced on every acquisition cycle.
    mutexes: HashMap<String, RwMutex>,
}

/// Maps (transaction, key) pairs to lock ownership and arbitrates
/// conflicting requests by delegating to one RwMutex per contended key.
///
/// Cheap to clone; clones share the same lock tables.
#[derive(Clone, Default)]
pub struct LockManager {
    state: Arc<StdMutex<ManagerState>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a lock on `key` for `txn_id`, suspending while another
    /// transaction's conflicting hold is in the way.
    ///
    /// Per LOCKING.md §2: a sufficient existing hold returns a no-op
    /// handle immediately; a Shared hold escalates to Exclusive by
    /// releasing the shared acquisition first; otherwise the key's
    /// registered mutex is probed at the requested mode, the probe is
    /// released, and a brand-new mutex is installed and held for real.
    pub async fn acquire_lock(&self, txn_id: TxnId, key: &str, mode: LockMode) -> LockReleaseHandle {
        let registered = {
            let mut state = self.state.lock().unwrap();

            let existing = state
                .records
                .iter()
                .position(|held| held.record.txn_id == txn_id && held.record.key == key);

            if let Some(index) = existing {
                let held_mode = state.records[index].record.mode;
                if held_mode == LockMode::Exclusive || held_mode == mode {
                    return LockReleaseHandle::noop();
                }

                // Shared -> Exclusive: drop the weaker hold before
                // queueing for the stronger one.
                let held = state.records.remove(index);
                if let Some(hold) = held.hold.lock().unwrap().take() {
                    hold.release();
                }
                Logger::trace(
                    Event::LockEscalate.as_str(),
                    &[("key", key), ("txn", &txn_id.to_string())],
                );
            }

            state.mutexes.get(key).cloned()
        };

        // Queue behind the key's active holder. The probe hold is
        // released immediately; only the fresh mutex's hold survives.
        if let Some(mutex) = registered {
            let probe = match mode {
                LockMode::Exclusive => mutex.acquire_write().await,
                LockMode::Shared => mutex.acquire_read().await,
            };
            probe.release();
        }

        let mutex = RwMutex::new();
        let hold = match mode {
            LockMode::Exclusive => mutex.acquire_write().await,
            LockMode::Shared => mutex.acquire_read().await,
        };
        let hold: HoldSlot = Arc::new(StdMutex::new(Some(hold)));

        {
            let mut state = self.state.lock().unwrap();
            state.mutexes.insert(key.to_string(), mutex);
            state.records.push(HeldLock {
                record: LockRecord::new(txn_id, key.to_string(), mode),
                hold: Arc::clone(&hold),
            });
        }

        LockReleaseHandle {
            inner: Some(HandleInner {
                state: Arc::clone(&self.state),
                txn_id,
                key: key.to_string(),
                hold,
            }),
        }
    }

    /// Snapshot of all outstanding lock records, in acquisition order.
    ///
    /// Diagnostic/test surface.
    pub fn locks(&self) -> Vec<LockRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .map(|held| held.record.clone())
            .collect()
    }

    /// Releases every recorded hold and wipes all lock and
    /// mutex-registration state.
    ///
    /// Test-only reset; never reachable from production call paths.
    pub fn clear_all(&self) {
        let mut state = self.state.lock().unwrap();
        for held in state.records.drain(..) {
            if let Some(hold) = held.hold.lock().unwrap().take() {
                hold.release();
            }
        }
        state.mutexes.clear();
        Logger::info(Event::LocksCleared.as_str(), &[]);
    }
}

impl fmt::Debug for LockManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("LockManager")
            .field("records", &state.records.len())
            .field("mutexes", &state.mutexes.len())
            .finish()
    }
}

struct HandleInner {
    state: Arc<StdMutex<ManagerState>>,
    txn_id: TxnId,
    key: String,
    hold: HoldSlot,
}

/// Releases a `LockManager` acquisition.
///
/// Per LOCKING.md §3, invoking the handle releases the underlying
/// RwMutex hold, deregisters the key's active-mutex entry, and clears
/// ALL lock records for the owning transaction. Other keys' underlying
/// holds are untouched by the bookkeeping wipe; every handle must still
/// be invoked individually to free its own RwMutex.
///
/// Dropping the handle releases too.
pub struct LockReleaseHandle {
    inner: Option<HandleInner>,
}

impl LockReleaseHandle {
    /// A handle that releases nothing, returned for idempotent
    /// re-acquisition of an already-sufficient hold.
    fn noop() -> Self {
        Self { inner: None }
    }

    /// Releases the hold and wipes the transaction's bookkeeping.
    pub fn release(mut self) {
        self.do_release();
    }

    fn do_release(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };

        // Escalation may have taken the hold already.
        if let Some(hold) = inner.hold.lock().unwrap().take() {
            hold.release();
        }

        let mut state = inner.state.lock().unwrap();
        state.mutexes.remove(&inner.key);
        state
            .records
            .retain(|held| held.record.txn_id != inner.txn_id);
    }
}

impl Drop for LockReleaseHandle {
    fn drop(&mut self) {
        self.do_release();
    }
}

impl fmt::Debug for LockReleaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockReleaseHandle")
            .field("released", &self.inner.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_mode_parse() {
        assert_eq!("shared".parse::<LockMode>(), Ok(LockMode::Shared));
        assert_eq!("exclusive".parse::<LockMode>(), Ok(LockMode::Exclusive));
    }

    #[test]
    fn test_lock_mode_parse_rejects_unknown() {
        let err = "intent-exclusive".parse::<LockMode>().unwrap_err();
        assert_eq!(err, LockError::InvalidMode("intent-exclusive".to_string()));
    }

    #[test]
    fn test_lock_mode_display_round_trips() {
        for mode in [LockMode::Shared, LockMode::Exclusive] {
            assert_eq!(mode.to_string().parse::<LockMode>(), Ok(mode));
        }
    }

    #[tokio::test]
    async fn test_noop_handle_releases_nothing() {
        let manager = LockManager::new();
        let txn = TxnId::new(1);

        let first = manager.acquire_lock(txn, "key1", LockMode::Exclusive).await;
        let second = manager.acquire_lock(txn, "key1", LockMode::Exclusive).await;

        second.release();
        assert_eq!(manager.locks().len(), 1, "no-op release keeps the record");

        first.release();
        assert!(manager.locks().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_wipes_state() {
        let manager = LockManager::new();
        let _hold = manager
            .acquire_lock(TxnId::new(1), "key1", LockMode::Shared)
            .await;

        manager.clear_all();
        assert!(manager.locks().is_empty());
    }
}
