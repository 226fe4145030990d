//! Transaction errors.

use thiserror::Error;

/// Result type for transaction operations
pub type TxnResult<T> = Result<T, TxnError>;

/// Transaction errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TxnError {
    /// get/set/commit was invoked on a transaction already marked
    /// rolled back. The checks run before any mutation, so store state
    /// is left exactly as it was.
    #[error("transaction is rolled back")]
    TransactionFinished,
}
