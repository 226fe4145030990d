//! Observable events
//!
//! Events are explicit and typed; the string form is the `event` field
//! of the corresponding log line.

use std::fmt;

/// Observable events in the store and lock subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A transaction drew its id
    TxnBegin,
    /// A transaction stamped its versions and released its locks
    TxnCommit,
    /// A transaction was marked rolled back and released its locks
    TxnRollback,
    /// A shared hold was upgraded to exclusive
    LockEscalate,
    /// Test-only lock table wipe
    LocksCleared,
    /// Test-only store wipe
    StoreReset,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::TxnBegin => "TXN_BEGIN",
            Event::TxnCommit => "TXN_COMMIT",
            Event::TxnRollback => "TXN_ROLLBACK",
            Event::LockEscalate => "LOCK_ESCALATE",
            Event::LocksCleared => "LOCKS_CLEARED",
            Event::StoreReset => "STORE_RESET",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
