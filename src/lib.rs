//! snapdb - A strict, in-memory MVCC transactional key-value store
//!
//! Four layered primitives, leaf-first:
//! - `txn_id` - monotonic transaction identity
//! - `lock` - reader/writer exclusion and per-key lock management
//! - `mvcc` - version chains, visibility, and the transactional store
//! - `observability` - structured event logging

pub mod lock;
pub mod mvcc;
pub mod observability;
pub mod txn_id;
