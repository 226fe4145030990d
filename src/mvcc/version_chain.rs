//! VersionChain - append-only per-key history
//!
//! Per ISOLATION.md §1:
//! - Versions are kept in creation order
//! - The chain is never compacted; rolled-back versions stay forever
//!
//! This is a data container plus the newest-first visibility wrapper.

use std::sync::Arc;

use crate::txn_id::TxnId;

use super::version::Version;
use super::visibility::Visibility;

/// The complete version history of a single key.
#[derive(Debug, Clone)]
pub struct VersionChain {
    key: String,
    versions: Vec<Arc<Version>>,
}

impl VersionChain {
    /// Creates an empty chain for the given key.
    pub fn new(key: String) -> Self {
        Self {
            key,
            versions: Vec::new(),
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// All versions in creation order. No visibility filtering.
    #[inline]
    pub fn versions(&self) -> &[Arc<Version>] {
        &self.versions
    }

    /// The sequence number the next append will carry: chain length
    /// plus one, which keeps per-key sequences dense.
    #[inline]
    pub fn next_sequence(&self) -> u64 {
        self.versions.len() as u64 + 1
    }

    /// Appends a version. Structural only; sequence assignment is the
    /// caller's job via `next_sequence`.
    pub fn push(&mut self, version: Arc<Version>) {
        self.versions.push(version);
    }

    /// The newest version visible to `reader`, per ISOLATION.md §3.
    pub fn visible_version(&self, reader: TxnId) -> Option<&Version> {
        Visibility::visible_version(self, reader)
    }
}
