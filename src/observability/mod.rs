//! Observability subsystem
//!
//! Structured event logging for the store and lock subsystem.
//!
//! Principles:
//! 1. Observability is read-only; no side effects on execution
//! 2. No async and no background threads
//! 3. Deterministic output (sorted keys, one line per event)

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
