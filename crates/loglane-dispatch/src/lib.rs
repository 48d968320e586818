//! loglane
//!
//! Structured, leveled logging with independently filtered sinks. The
//! [`Dispatcher`] records every event in a bounded history and hands it to
//! each registered sink whose threshold it meets; file and HTTP sinks queue
//! the work onto their own threads so callers never wait on I/O.

#[macro_use]
mod macros;

pub mod dispatcher;
pub mod global;

#[cfg(test)]
mod testing;

pub use dispatcher::Dispatcher;
pub use global::{default_dispatcher, set_default, shutdown};

// Re-export the building blocks so hosts depend on one crate
pub use loglane_core::{
    encode, encode_value, json, ConfigError, ConsoleOptions, Event, FileOptions, Format,
    HistoryBuffer, HttpOptions, Kind, Level, LogConfig, Sink, SinkConfig, SinkError,
    Stream, Value,
};
pub use loglane_output::{
    build_sink, ConsoleSink, FileSink, HttpSink, RelayOptions, RelaySink,
};
