//! RwMutex - async reader/writer exclusion over one logical resource
//!
//! Per LOCKING.md §1, the observable contract is exactly four rules:
//! 1. A pending or held writer blocks all readers and all other writers
//! 2. A held reader blocks a writer from acquiring
//! 3. A held reader does not block another reader from acquiring
//! 4. Acquisition suspends when blocked; release is synchronous and
//!    always succeeds
//!
//! Strategy: a write gate (`tokio::sync::Mutex<()>`) plus a reader
//! count behind a short critical section. A writer takes the gate, then
//! waits for the count to drain to zero. A reader passes through the
//! gate without keeping it, so a pending writer parks later readers
//! while settled readers never wait on each other.
//!
//! No fairness or FIFO ordering beyond the four rules.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex as AsyncMutex, Notify, OwnedMutexGuard};

/// An async reader/writer mutex: many concurrent readers or exactly one
/// writer, never both.
///
/// Cheap to clone; clones share the same logical resource.
#[derive(Clone)]
pub struct RwMutex {
    shared: Arc<RwShared>,
}

struct RwShared {
    /// Held for a writer's whole ownership; taken briefly by readers on
    /// entry so a pending writer blocks them (LOCKING.md §1 rule 1).
    write_gate: Arc<AsyncMutex<()>>,
    /// Number of settled readers.
    readers: StdMutex<usize>,
    /// Signalled when the reader count drains to zero.
    readers_idle: Notify,
}

impl RwMutex {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(RwShared {
                write_gate: Arc::new(AsyncMutex::new(())),
                readers: StdMutex::new(0),
                readers_idle: Notify::new(),
            }),
        }
    }

    /// Suspends until no writer and no reader holds the resource, then
    /// takes exclusive ownership.
    pub async fn acquire_write(&self) -> RwReleaseHandle {
        let gate = Arc::clone(&self.shared.write_gate).lock_owned().await;

        // The gate is ours, so the reader count can only drain from
        // here on. Register for the idle edge before re-checking to
        // avoid missing a wakeup.
        loop {
            let idle = self.shared.readers_idle.notified();
            if *self.shared.readers.lock().unwrap() == 0 {
                break;
            }
            idle.await;
        }

        RwReleaseHandle {
            inner: Some(HandleInner::Write(gate)),
        }
    }

    /// Suspends only while a writer holds (or is pending on) the
    /// resource; once past the gate, joins the reader set without
    /// waiting on other readers.
    pub async fn acquire_read(&self) -> RwReleaseHandle {
        let gate = Arc::clone(&self.shared.write_gate).lock_owned().await;
        *self.shared.readers.lock().unwrap() += 1;
        drop(gate);

        RwReleaseHandle {
            inner: Some(HandleInner::Read(Arc::clone(&self.shared))),
        }
    }
}

impl Default for RwMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RwMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RwMutex")
            .field("readers", &*self.shared.readers.lock().unwrap())
            .finish()
    }
}

enum HandleInner {
    /// Exclusive ownership; dropping the gate guard releases it.
    Write(OwnedMutexGuard<()>),
    /// One settled reader; release decrements the count.
    Read(Arc<RwShared>),
}

/// Releases an `RwMutex` acquisition.
///
/// Per LOCKING.md §1 rule 4, release is synchronous and always
/// succeeds. Dropping the handle releases too; `release` exists so
/// callers can make the hand-off explicit.
pub struct RwReleaseHandle {
    inner: Option<HandleInner>,
}

impl RwReleaseHandle {
    /// Releases the underlying hold.
    pub fn release(mut self) {
        self.do_release();
    }

    fn do_release(&mut self) {
        match self.inner.take() {
            Some(HandleInner::Write(gate)) => drop(gate),
            Some(HandleInner::Read(shared)) => {
                let mut readers = shared.readers.lock().unwrap();
                *readers -= 1;
                let drained = *readers == 0;
                drop(readers);
                if drained {
                    shared.readers_idle.notify_waiters();
                }
            }
            None => {}
        }
    }
}

impl Drop for RwReleaseHandle {
    fn drop(&mut self) {
        self.do_release();
    }
}

impl std::fmt::Debug for RwReleaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.inner {
            Some(HandleInner::Write(_)) => "write",
            Some(HandleInner::Read(_)) => "read",
            None => "released",
        };
        f.debug_struct("RwReleaseHandle").field("kind", &kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncontended_write_then_read() {
        let mutex = RwMutex::new();

        let write = mutex.acquire_write().await;
        write.release();

        let read = mutex.acquire_read().await;
        read.release();
    }

    #[tokio::test]
    async fn test_two_readers_settle_together() {
        let mutex = RwMutex::new();

        let r1 = mutex.acquire_read().await;
        let r2 = mutex.acquire_read().await;
        assert_eq!(*mutex.shared.readers.lock().unwrap(), 2);

        r1.release();
        r2.release();
        assert_eq!(*mutex.shared.readers.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_hold() {
        let mutex = RwMutex::new();

        {
            let _write = mutex.acquire_write().await;
        }

        // A dropped write handle must leave the resource free.
        let write = mutex.acquire_write().await;
        write.release();
    }
}
