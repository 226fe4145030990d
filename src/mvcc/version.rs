//! Version - one immutable entry in a key's history
//!
//! Per ISOLATION.md §1:
//! - `sequence` is 1-based and dense per key
//! - `committer_txn_id` starts unset and transitions exactly once, at
//!   commit, never changing afterward
//! - A version is otherwise immutable after creation
//!
//! The set-once committer id is encoded structurally with `OnceLock`,
//! so a repeated stamp cannot overwrite an earlier one.

use std::sync::OnceLock;

use crate::txn_id::TxnId;

/// A single immutable version of a value.
///
/// Fields are private to enforce immutability; `mark_committed` is the
/// only state transition a version ever undergoes.
#[derive(Debug)]
pub struct Version {
    /// 1-based position in the key's chain.
    sequence: u64,
    /// The written value.
    value: String,
    /// The transaction that authored this version.
    writer_txn_id: TxnId,
    /// Set exactly once, at commit. Unset forever for rolled-back
    /// writers, which keeps their versions permanently invisible.
    committer_txn_id: OnceLock<TxnId>,
}

impl Version {
    /// Creates an uncommitted version.
    pub fn new(sequence: u64, value: String, writer_txn_id: TxnId) -> Self {
        Self {
            sequence,
            value,
            writer_txn_id,
            committer_txn_id: OnceLock::new(),
        }
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn writer_txn_id(&self) -> TxnId {
        self.writer_txn_id
    }

    /// Returns the commit id, if this version has been committed.
    #[inline]
    pub fn committer_txn_id(&self) -> Option<TxnId> {
        self.committer_txn_id.get().copied()
    }

    #[inline]
    pub fn is_committed(&self) -> bool {
        self.committer_txn_id.get().is_some()
    }

    /// Stamps the commit id. Set-once: a repeated stamp is ignored.
    pub(crate) fn mark_committed(&self, committer: TxnId) {
        let _ = self.committer_txn_id.set(committer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_version_is_uncommitted() {
        let version = Version::new(1, "v".to_string(), TxnId::new(3));

        assert_eq!(version.sequence(), 1);
        assert_eq!(version.value(), "v");
        assert_eq!(version.writer_txn_id(), TxnId::new(3));
        assert_eq!(version.committer_txn_id(), None);
        assert!(!version.is_committed());
    }

    #[test]
    fn test_mark_committed_sets_once() {
        let version = Version::new(1, "v".to_string(), TxnId::new(3));

        version.mark_committed(TxnId::new(7));
        assert_eq!(version.committer_txn_id(), Some(TxnId::new(7)));

        // A second stamp must not overwrite the first.
        version.mark_committed(TxnId::new(9));
        assert_eq!(version.committer_txn_id(), Some(TxnId::new(7)));
    }
}
