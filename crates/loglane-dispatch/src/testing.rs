use loglane_core::{Event, Level, Sink, SinkError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Sink that keeps every delivered event in memory
pub(crate) struct Recorder {
    level: Level,
    events: Mutex<Vec<Event>>,
    shutdowns: AtomicUsize,
}

impl Recorder {
    pub(crate) fn new(level: Level) -> Arc<Self> {
        Arc::new(Self {
            level,
            events: Mutex::new(Vec::new()),
            shutdowns: AtomicUsize::new(0),
        })
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.message().to_string())
            .collect()
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl Sink for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn level(&self) -> Level {
        self.level
    }

    fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
