//! Closeable blocking FIFO connecting two pipeline stages.
//!
//! A thin wrapper over an unbounded crossbeam channel that turns
//! "all senders dropped" into an explicit `close()` operation. The
//! closed-and-empty signal returned by [`Queue::blocking_pop`] is the single
//! source of truth for stage termination; no stage consults a separate
//! shutdown flag.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::sync::Mutex;

/// Unbounded FIFO shared between one producer stage and one consumer stage.
///
/// `push` never blocks. Once `close()` has been called, items already queued
/// are still delivered; only a queue that is both closed and drained reports
/// closure from `blocking_pop`.
pub struct Queue<T> {
    tx: Mutex<Option<Sender<T>>>,
    rx: Receiver<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx: Mutex::new(Some(tx)),
            rx,
        }
    }

    /// Append an item and wake one waiting consumer. An item pushed after
    /// `close()` is dropped; the sole producer is also the closer, so the
    /// pipeline never exercises that path.
    pub fn push(&self, item: T) {
        if let Some(tx) = self.tx.lock().unwrap().as_ref() {
            // The queue owns its receiver, so send on an open channel
            // cannot fail.
            let _ = tx.send(item);
        }
    }

    /// Remove the head item if one is present, without blocking.
    pub fn try_pop(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block until an item is available or the queue is closed and drained.
    /// `None` means closed-and-empty.
    pub fn blocking_pop(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Irreversibly mark the queue as finished: no further items will be
    /// pushed. Wakes all blocked consumers.
    pub fn close(&self) {
        self.tx.lock().unwrap().take();
    }

    /// Advisory snapshot; stale the instant it returns under concurrent use.
    /// Callers must rely on `blocking_pop` returning `None`, not on this,
    /// for termination.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}
