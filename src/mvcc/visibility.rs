//! Visibility - deterministic snapshot isolation
//!
//! Per ISOLATION.md §3, a version V is visible to reading transaction
//! R exactly when:
//! 1. `V.writer_txn_id == R.id` (read-your-own-writes), or
//! 2. `V.committer_txn_id` is set and strictly less than `R.id`
//!
//! The chain is scanned newest-to-oldest; the first visible version
//! wins. This rule admits no exceptions: no wall-clock influence, no
//! heuristic snapshot selection.
//!
//! Because begin-ids and commit-ids come from one shared sequence, a
//! commit that happens after R began stamps an id greater than R's own
//! id and stays invisible for R's whole lifetime. Snapshot isolation
//! falls out of id ordering alone (ISOLATION.md §4).

use crate::txn_id::TxnId;

use super::version::Version;
use super::version_chain::VersionChain;

/// Stateless visibility resolver.
///
/// A pure function module; identical inputs always resolve identically.
pub struct Visibility;

impl Visibility {
    /// The newest version in `chain` visible to `reader`, or None.
    pub fn visible_version(chain: &VersionChain, reader: TxnId) -> Option<&Version> {
        chain
            .versions()
            .iter()
            .rev()
            .map(|v| v.as_ref())
            .find(|&v| Self::is_visible_to(v, reader))
    }

    /// Applies the two-clause rule from ISOLATION.md §3 to one version.
    pub fn is_visible_to(version: &Version, reader: TxnId) -> bool {
        if version.writer_txn_id() == reader {
            return true;
        }
        match version.committer_txn_id() {
            Some(committer) => committer < reader,
            None => false,
        }
    }
}
