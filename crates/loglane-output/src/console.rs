use loglane_core::{encode, ConsoleOptions, Event, Format, Level, Sink, SinkError, Stream};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

enum Target {
    Stdout,
    Stderr,
    Writer(Mutex<Box<dyn Write + Send>>),
}

/// Writes events synchronously to a standard stream (or any writer).
///
/// Encoding and the write both happen on the caller's thread; each event is
/// written with a single `write_all` under the stream lock so concurrent
/// callers never interleave within a line.
pub struct ConsoleSink {
    format: Format,
    level: Level,
    target: Target,
}

impl ConsoleSink {
    pub fn new(opts: ConsoleOptions) -> Self {
        let target = match opts.stream {
            Stream::Stdout => Target::Stdout,
            Stream::Stderr => Target::Stderr,
        };
        Self {
            format: opts.format,
            level: opts.level,
            target,
        }
    }

    /// Console-style sink over an arbitrary writer
    pub fn with_writer(writer: impl Write + Send + 'static, format: Format, level: Level) -> Self {
        Self {
            format,
            level,
            target: Target::Writer(Mutex::new(Box::new(writer))),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        match &self.target {
            Target::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            Target::Stderr => {
                let mut out = io::stderr().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            Target::Writer(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                writer.write_all(bytes)?;
                writer.flush()
            }
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(ConsoleOptions::default())
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn level(&self) -> Level {
        self.level
    }

    fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        let bytes = encode(event, self.format)?;
        self.write_bytes(&bytes)?;
        debug!(format = %self.format, "Wrote event to console");
        Ok(())
    }

    fn shutdown(&self) {}
}
