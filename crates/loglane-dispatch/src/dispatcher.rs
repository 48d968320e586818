use loglane_core::{
    ConfigError, Event, Format, HistoryBuffer, Kind, LogConfig, Sink, SinkConfig, Value,
    DEFAULT_HISTORY_CAPACITY,
};
use loglane_output::{build_sink, ConsoleSink};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Routes every emitted event to the history buffer and to each registered
/// sink whose threshold it meets.
///
/// Sinks are called in registration order on the emitting thread. The sink
/// list lock is only held long enough to copy the list, so a slow sink never
/// blocks registration and a failing sink never stops the ones after it.
pub struct Dispatcher {
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    history: HistoryBuffer,
}

impl Dispatcher {
    /// Dispatcher with no sinks and the default history capacity
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            sinks: RwLock::new(Vec::new()),
            history: HistoryBuffer::new(capacity),
        }
    }

    /// Build a dispatcher and start every configured sink.
    ///
    /// If one sink fails validation, the sinks started before it are shut
    /// down again and the error is returned.
    pub fn from_config(config: &LogConfig) -> Result<Self, ConfigError> {
        Self::from_config_with(config, build_sink)
    }

    fn from_config_with<F>(config: &LogConfig, build: F) -> Result<Self, ConfigError>
    where
        F: Fn(&SinkConfig) -> Result<Arc<dyn Sink>, ConfigError>,
    {
        let dispatcher = Self::with_history_capacity(config.history_capacity);

        for sink_config in &config.sinks {
            match build(sink_config) {
                Ok(sink) => dispatcher.add_sink(sink),
                Err(e) => {
                    warn!(error = %e, "Invalid sink configuration");
                    dispatcher.shutdown();
                    return Err(e);
                }
            }
        }

        info!(
            sinks = dispatcher.sink_count(),
            history_capacity = config.history_capacity,
            "Dispatcher configured"
        );
        Ok(dispatcher)
    }

    /// Register a sink; it receives every event emitted from now on
    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        debug!(sink = sink.name(), level = %sink.level(), "Adding sink to dispatcher");
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    /// Builder-style [`add_sink`](Self::add_sink)
    pub fn with_sink<S: Sink + 'static>(self, sink: S) -> Self {
        self.add_sink(Arc::new(sink));
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Names of the registered sinks, in registration order
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.registered().iter().map(|s| s.name()).collect()
    }

    /// Emit one event.
    ///
    /// `args` is a flat key/value list. A [`Kind::Fatal`] event shuts every
    /// sink down and exits the process with status 1; a [`Kind::Panic`]
    /// event panics with the message. Both happen after dispatch.
    pub fn emit(&self, kind: Kind, msg: impl Into<String>, args: Vec<Value>) {
        let event = Event::new(kind, msg, args);
        self.publish(&event);

        match kind {
            Kind::Fatal => self.terminate(),
            Kind::Panic => panic!("{}", event.message()),
            _ => {}
        }
    }

    /// [`emit`](Self::emit) with a formatted message
    pub fn emit_fmt(&self, kind: Kind, msg: fmt::Arguments<'_>, args: Vec<Value>) {
        match msg.as_str() {
            Some(s) => self.emit(kind, s, args),
            None => self.emit(kind, msg.to_string(), args),
        }
    }

    pub fn debug(&self, msg: impl Into<String>, args: Vec<Value>) {
        self.emit(Kind::Debug, msg, args);
    }

    pub fn info(&self, msg: impl Into<String>, args: Vec<Value>) {
        self.emit(Kind::Info, msg, args);
    }

    pub fn warn(&self, msg: impl Into<String>, args: Vec<Value>) {
        self.emit(Kind::Warn, msg, args);
    }

    pub fn error(&self, msg: impl Into<String>, args: Vec<Value>) {
        self.emit(Kind::Error, msg, args);
    }

    /// Statistic event: labeled `STAT`, routed at Info
    pub fn stat(&self, msg: impl Into<String>, args: Vec<Value>) {
        self.emit(Kind::Stat, msg, args);
    }

    pub fn fatal(&self, msg: impl Into<String>, args: Vec<Value>) -> ! {
        let event = Event::new(Kind::Fatal, msg, args);
        self.publish(&event);
        self.terminate()
    }

    pub fn panic(&self, msg: impl Into<String>, args: Vec<Value>) -> ! {
        let event = Event::new(Kind::Panic, msg, args);
        self.publish(&event);
        panic!("{}", event.message())
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// The most recent `limit` events; `0` returns the whole history
    pub fn snapshot(&self, limit: usize) -> Vec<Event> {
        self.history.snapshot(limit)
    }

    pub fn snapshot_encoded(&self, limit: usize, format: Format) -> Vec<Value> {
        self.history.snapshot_encoded(limit, format)
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    /// Shut every sink down in registration order, waiting for each to
    /// finish. Safe to call more than once.
    pub fn shutdown(&self) {
        for sink in self.registered() {
            debug!(sink = sink.name(), "Shutting down sink");
            sink.shutdown();
        }
    }

    fn registered(&self) -> Vec<Arc<dyn Sink>> {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn publish(&self, event: &Event) {
        self.history.append(event);

        for sink in self.registered() {
            if !sink.accepts(event.level()) {
                continue;
            }
            if let Err(e) = sink.deliver(event) {
                warn!(sink = sink.name(), error = %e, "Sink failed to deliver event");
            }
        }
    }

    fn terminate(&self) -> ! {
        self.shutdown();
        std::process::exit(1)
    }
}

impl Default for Dispatcher {
    /// Console sink on stdout, styled, at Info
    fn default() -> Self {
        Self::new().with_sink(ConsoleSink::default())
    }
}
