//! Bounded queue drained by one dedicated thread.
//!
//! Producers never block: [`QueueWorker::push`] is a single `try_send` and a
//! full queue drops the item. Shutdown drops the sending half, which lets the
//! worker drain whatever is still queued and then see the channel close.

use loglane_core::ConfigError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Outcome of a non-blocking enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Enqueue {
    Queued,
    /// Queue at capacity, item dropped
    Full,
    /// Worker shut down (or gone), item dropped
    Closed,
}

pub(crate) struct QueueWorker<T> {
    name: &'static str,
    tx: RwLock<Option<SyncSender<T>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl<T: Send + 'static> QueueWorker<T> {
    /// Start a worker thread running `run` over the receiving half
    pub(crate) fn spawn<F>(name: &'static str, capacity: usize, run: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(Receiver<T>) + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel::<T>(capacity);

        let handle = thread::Builder::new()
            .name(format!("loglane-{}", name))
            .spawn(move || run(rx))
            .map_err(|source| ConfigError::Worker { sink: name, source })?;

        debug!(sink = name, capacity, "Started sink worker");

        Ok(Self {
            name,
            tx: RwLock::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            dropped: AtomicU64::new(0),
        })
    }

    /// Try to enqueue without blocking
    pub(crate) fn push(&self, item: T) -> Enqueue {
        let tx = self.tx.read().unwrap_or_else(PoisonError::into_inner);

        let outcome = match tx.as_ref() {
            None => Enqueue::Closed,
            Some(tx) => match tx.try_send(item) {
                Ok(()) => Enqueue::Queued,
                Err(TrySendError::Full(_)) => Enqueue::Full,
                Err(TrySendError::Disconnected(_)) => Enqueue::Closed,
            },
        };

        if outcome != Enqueue::Queued {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        outcome
    }
}

impl<T> QueueWorker<T> {
    /// Close the queue and wait for the worker to drain it and exit.
    ///
    /// Later calls return once the first one has finished joining.
    pub(crate) fn shutdown(&self) {
        let tx = self.tx.write().unwrap_or_else(PoisonError::into_inner).take();
        drop(tx);

        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = handle.take() {
            if handle.join().is_err() {
                error!(sink = self.name, "Sink worker panicked");
            } else {
                debug!(sink = self.name, "Sink worker stopped");
            }
        }
    }

    /// Items dropped because the queue was full or closed
    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T> Drop for QueueWorker<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
