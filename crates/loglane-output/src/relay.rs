use loglane_core::{Event, Level, Sink, SinkError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tracing::debug;

/// Options for a [`RelaySink`]
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Bounded channel owned by the consumer
    pub sender: Sender<Event>,
    pub level: Level,
}

impl RelayOptions {
    pub fn new(sender: Sender<Event>) -> Self {
        Self {
            sender,
            level: Level::Info,
        }
    }
}

/// Forwards a copy of each event onto a caller-supplied bounded channel.
///
/// A full channel drops the event; the producer never waits on the consumer.
pub struct RelaySink {
    level: Level,
    sender: RwLock<Option<Sender<Event>>>,
    dropped: AtomicU64,
}

impl RelaySink {
    pub fn new(opts: RelayOptions) -> Self {
        Self {
            level: opts.level,
            sender: RwLock::new(Some(opts.sender)),
            dropped: AtomicU64::new(0),
        }
    }

    /// Events dropped because the channel was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Sink for RelaySink {
    fn name(&self) -> &'static str {
        "relay"
    }

    fn level(&self) -> Level {
        self.level
    }

    fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.as_ref() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        };

        match sender.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Drop this sink's sender. The consumer sees end-of-stream once every
    /// other clone of the sender is gone too.
    fn shutdown(&self) {
        let sender = self.sender.write().unwrap_or_else(PoisonError::into_inner).take();
        if sender.is_some() {
            debug!(dropped = self.dropped(), "Relay sink closed");
        }
    }
}
