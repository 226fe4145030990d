//! MVCC - version chains, visibility, and the transactional store
//!
//! This module provides:
//! - `Version` - immutable entry with a set-once committer id
//! - `VersionChain` - append-only per-key history
//! - `Visibility` - the ISOLATION.md §3 snapshot rule
//! - `Store` / `Transaction` - begin/get/set/commit/rollback
//! - `TxnError` - the misuse conditions

mod errors;
mod store;
mod transaction;
mod version;
mod version_chain;
mod visibility;

pub use errors::{TxnError, TxnResult};
pub use store::Store;
pub use transaction::Transaction;
pub use version::Version;
pub use version_chain::VersionChain;
pub use visibility::Visibility;
