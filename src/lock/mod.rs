//! Lock subsystem
//!
//! Two layers, per LOCKING.md:
//! - `RwMutex` - async reader/writer exclusion over one resource (§1)
//! - `LockManager` - per-key arbitration across transactions, with
//!   escalation and idempotent re-acquisition (§2-§3)

mod errors;
mod manager;
mod rw_mutex;

pub use errors::{LockError, LockResult};
pub use manager::{LockManager, LockMode, LockRecord, LockReleaseHandle};
pub use rw_mutex::{RwMutex, RwReleaseHandle};
