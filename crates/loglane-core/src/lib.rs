//! loglane core
//!
//! Core types for the loglane structured logger: events, encodings, the
//! bounded history buffer, the sink contract and configuration.

pub mod config;
pub mod encoding;
pub mod error;
pub mod event;
pub mod history;
pub mod traits;

// Re-export commonly used types
pub use config::{
    ConsoleOptions, FileOptions, HttpOptions, LogConfig, SinkConfig, Stream, QUEUE_CAPACITY,
};
pub use encoding::{encode, encode_value, strip_ansi, Format};
pub use error::{ConfigError, SinkError};
pub use event::{fields_from_args, Event, Kind, Level};
pub use history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
pub use serde_json::{json, Value};
pub use traits::Sink;
