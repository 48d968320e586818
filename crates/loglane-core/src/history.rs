use crate::encoding::{self, Format};
use crate::event::Event;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

/// Capacity of the history kept by the default dispatcher
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Fixed-capacity ring of the most recently emitted events.
///
/// Appends and clears take the write lock; snapshots share the read lock and
/// hand back owned copies, so a reader never holds on to buffer storage.
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: RwLock<VecDeque<Event>>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Store a copy of `event`, evicting the oldest entry once full
    pub fn append(&self, event: &Event) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(event.clone());
    }

    /// The most recent `limit` events in emission order; `0` returns all
    pub fn snapshot(&self, limit: usize) -> Vec<Event> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let skip = if limit == 0 || limit >= entries.len() {
            0
        } else {
            entries.len() - limit
        };
        entries.iter().skip(skip).cloned().collect()
    }

    /// Like [`snapshot`](Self::snapshot), with each event pre-encoded
    pub fn snapshot_encoded(&self, limit: usize, format: Format) -> Vec<Value> {
        self.snapshot(limit)
            .iter()
            .map(|event| encoding::encode_value(event, format))
            .collect()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
