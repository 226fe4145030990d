//! RwMutex blocking-rule tests
//!
//! One test per observable rule:
//! - a held writer blocks writers and readers
//! - a held reader blocks writers but not readers
//! - a pending writer parks later readers
//!
//! Blocked tasks are observed with a completion flag plus a short
//! settle delay, then unblocked by releasing the conflicting hold.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use snapdb::lock::RwMutex;
use tokio::time::sleep;

/// Long enough for a spawned task to reach its suspension point.
async fn settle() {
    sleep(Duration::from_millis(20)).await;
}

fn flag() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[tokio::test]
async fn test_held_writer_blocks_writer() {
    let mutex = RwMutex::new();
    let held = mutex.acquire_write().await;

    let finished = flag();
    let task = {
        let mutex = mutex.clone();
        let finished = Arc::clone(&finished);
        tokio::spawn(async move {
            let hold = mutex.acquire_write().await;
            hold.release();
            finished.store(true, Ordering::SeqCst);
        })
    };

    settle().await;
    assert!(
        !finished.load(Ordering::SeqCst),
        "second writer must stay blocked while the first holds"
    );

    held.release();
    task.await.unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_held_writer_blocks_reader() {
    let mutex = RwMutex::new();
    let held = mutex.acquire_write().await;

    let finished = flag();
    let task = {
        let mutex = mutex.clone();
        let finished = Arc::clone(&finished);
        tokio::spawn(async move {
            let hold = mutex.acquire_read().await;
            hold.release();
            finished.store(true, Ordering::SeqCst);
        })
    };

    settle().await;
    assert!(
        !finished.load(Ordering::SeqCst),
        "reader must stay blocked while a writer holds"
    );

    held.release();
    task.await.unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_held_reader_blocks_writer() {
    let mutex = RwMutex::new();
    let held = mutex.acquire_read().await;

    let finished = flag();
    let task = {
        let mutex = mutex.clone();
        let finished = Arc::clone(&finished);
        tokio::spawn(async move {
            let hold = mutex.acquire_write().await;
            hold.release();
            finished.store(true, Ordering::SeqCst);
        })
    };

    settle().await;
    assert!(
        !finished.load(Ordering::SeqCst),
        "writer must stay blocked while a reader holds"
    );

    held.release();
    task.await.unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_held_reader_does_not_block_reader() {
    let mutex = RwMutex::new();
    let held = mutex.acquire_read().await;

    let finished = flag();
    let task = {
        let mutex = mutex.clone();
        let finished = Arc::clone(&finished);
        tokio::spawn(async move {
            let hold = mutex.acquire_read().await;
            hold.release();
            finished.store(true, Ordering::SeqCst);
        })
    };

    settle().await;
    assert!(
        finished.load(Ordering::SeqCst),
        "second reader must settle while the first still holds"
    );

    held.release();
    task.await.unwrap();
}

#[tokio::test]
async fn test_writer_waits_for_every_reader() {
    let mutex = RwMutex::new();
    let r1 = mutex.acquire_read().await;
    let r2 = mutex.acquire_read().await;

    let finished = flag();
    let task = {
        let mutex = mutex.clone();
        let finished = Arc::clone(&finished);
        tokio::spawn(async move {
            let hold = mutex.acquire_write().await;
            hold.release();
            finished.store(true, Ordering::SeqCst);
        })
    };

    settle().await;
    r1.release();

    settle().await;
    assert!(
        !finished.load(Ordering::SeqCst),
        "writer must wait for the last reader"
    );

    r2.release();
    task.await.unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_pending_writer_parks_later_reader() {
    let mutex = RwMutex::new();
    let held_read = mutex.acquire_read().await;

    // Writer queues behind the held reader.
    let writer_finished = flag();
    let writer = {
        let mutex = mutex.clone();
        let finished = Arc::clone(&writer_finished);
        tokio::spawn(async move {
            let hold = mutex.acquire_write().await;
            settle().await;
            hold.release();
            finished.store(true, Ordering::SeqCst);
        })
    };
    settle().await;

    // A reader arriving behind the pending writer must wait too.
    let reader_finished = flag();
    let reader = {
        let mutex = mutex.clone();
        let finished = Arc::clone(&reader_finished);
        tokio::spawn(async move {
            let hold = mutex.acquire_read().await;
            hold.release();
            finished.store(true, Ordering::SeqCst);
        })
    };

    settle().await;
    assert!(!reader_finished.load(Ordering::SeqCst));

    held_read.release();
    writer.await.unwrap();
    reader.await.unwrap();
    assert!(writer_finished.load(Ordering::SeqCst));
    assert!(reader_finished.load(Ordering::SeqCst));
}
