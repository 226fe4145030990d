//! Transaction - begin/get/set/commit/rollback
//!
//! Strict two-phase locking: every get takes a Shared lock and every
//! set an Exclusive lock on the touched key, held until transaction
//! end and released together at commit or rollback. The only
//! suspension points are those lock acquisitions; there is no deadlock
//! detection and no timeout (LOCKING.md §4).
//!
//! Per ISOLATION.md §5, only `rollback` marks the transaction
//! terminally finished. `commit` does not set an equivalent flag, so
//! get/set/commit after a commit are accepted. Deliberate fidelity to
//! the reference behavior; see DESIGN.md before changing it.

use std::sync::Arc;

use crate::lock::{LockMode, LockReleaseHandle};
use crate::observability::{Event, Logger};
use crate::txn_id::TxnId;

use super::errors::{TxnError, TxnResult};
use super::store::StoreShared;
use super::version::Version;
use super::version_chain::VersionChain;

/// One logical thread of control against the store.
///
/// Dropping a transaction without commit or rollback releases its lock
/// holds; its authored versions stay unstamped and therefore invisible,
/// which is equivalent to a rollback.
pub struct Transaction {
    id: TxnId,
    rolled_back: bool,
    /// Versions this transaction appended, for commit stamping.
    authored: Vec<Arc<Version>>,
    /// Lock release handles, one per acquisition, released together at
    /// transaction end.
    held: Vec<LockReleaseHandle>,
    store: Arc<StoreShared>,
}

impl Transaction {
    pub(super) fn new(id: TxnId, store: Arc<StoreShared>) -> Self {
        Self {
            id,
            rolled_back: false,
            authored: Vec::new(),
            held: Vec::new(),
            store,
        }
    }

    #[inline]
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// Reads `key` under this transaction's snapshot.
    ///
    /// Takes a Shared lock on the key, held until transaction end, then
    /// scans the chain newest-to-oldest for the first version visible
    /// per ISOLATION.md §3. Returns None if the chain is absent or no
    /// version matches.
    pub async fn get(&mut self, key: &str) -> TxnResult<Option<String>> {
        if self.rolled_back {
            return Err(TxnError::TransactionFinished);
        }

        let handle = self
            .store
            .locks
            .acquire_lock(self.id, key, LockMode::Shared)
            .await;
        self.held.push(handle);

        let chains = self.store.chains.lock().unwrap();
        Ok(chains
            .get(key)
            .and_then(|chain| chain.visible_version(self.id))
            .map(|version| version.value().to_string()))
    }

    /// Writes `value` to `key`.
    ///
    /// Takes an Exclusive lock on the key, held until transaction end,
    /// then appends an uncommitted version with the next dense sequence
    /// number, creating the chain if absent.
    pub async fn set(&mut self, key: &str, value: &str) -> TxnResult<()> {
        if self.rolled_back {
            return Err(TxnError::TransactionFinished);
        }

        let handle = self
            .store
            .locks
            .acquire_lock(self.id, key, LockMode::Exclusive)
            .await;
        self.held.push(handle);

        let mut chains = self.store.chains.lock().unwrap();
        let chain = chains
            .entry(key.to_string())
            .or_insert_with(|| VersionChain::new(key.to_string()));

        let version = Arc::new(Version::new(
            chain.next_sequence(),
            value.to_string(),
            self.id,
        ));
        chain.push(Arc::clone(&version));
        self.authored.push(version);

        Ok(())
    }

    /// Commits: draws one fresh id as the commit timestamp, stamps it
    /// on every authored version, then releases every held lock.
    ///
    /// Synchronous throughout, so there is no partial-commit window:
    /// nothing can interleave between stamping and release, and the
    /// Exclusive locks held since the writes keep other transactions
    /// off the written keys until release.
    pub fn commit(&mut self) -> TxnResult<()> {
        if self.rolled_back {
            return Err(TxnError::TransactionFinished);
        }

        let committer = self.store.txn_ids.next_id();
        for version in &self.authored {
            version.mark_committed(committer);
        }
        for handle in self.held.drain(..) {
            handle.release();
        }

        Logger::trace(
            Event::TxnCommit.as_str(),
            &[
                ("commit_id", &committer.to_string()),
                ("txn", &self.id.to_string()),
            ],
        );
        Ok(())
    }

    /// Rolls back: marks the transaction terminally finished and
    /// releases every held lock. Authored versions stay in their
    /// chains forever with the committer id unset: inert, invisible,
    /// never reclaimed. Idempotent.
    pub fn rollback(&mut self) {
        self.rolled_back = true;
        for handle in self.held.drain(..) {
            handle.release();
        }

        Logger::trace(Event::TxnRollback.as_str(), &[("txn", &self.id.to_string())]);
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("rolled_back", &self.rolled_back)
            .field("authored", &self.authored.len())
            .field("held", &self.held.len())
            .finish()
    }
}
