//! loglane output
//!
//! Sinks for the loglane structured logger: a synchronous console sink, a
//! non-blocking channel relay, and queue-backed file and HTTP sinks that each
//! own one worker thread.

pub mod console;
pub mod file;
pub mod http;
pub mod relay;
mod worker;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use http::HttpSink;
pub use relay::{RelayOptions, RelaySink};

use loglane_core::{ConfigError, Sink, SinkConfig};
use std::sync::Arc;

/// Build and start the sink described by `config`
pub fn build_sink(config: &SinkConfig) -> Result<Arc<dyn Sink>, ConfigError> {
    let sink: Arc<dyn Sink> = match config {
        SinkConfig::Console(opts) => Arc::new(ConsoleSink::new(opts.clone())),
        SinkConfig::File(opts) => Arc::new(FileSink::new(opts.clone())?),
        SinkConfig::Http(opts) => Arc::new(HttpSink::new(opts.clone())?),
    };
    Ok(sink)
}
