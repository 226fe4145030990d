//! Lock subsystem errors.

use thiserror::Error;

/// Result type for lock operations
pub type LockResult<T> = Result<T, LockError>;

/// Lock subsystem errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockError {
    /// A lock-mode value outside {shared, exclusive}.
    ///
    /// This is a programming error in the caller, not a runtime
    /// condition; the typed `LockMode` enum makes it unrepresentable
    /// inside the manager, so it can only surface where an untyped
    /// mode enters the system.
    #[error("invalid lock mode: {0}")]
    InvalidMode(String),
}
