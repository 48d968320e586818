use crate::worker::{Enqueue, QueueWorker};
use chrono::Local;
use loglane_core::{
    encode, ConfigError, Event, FileOptions, Format, Level, Sink, SinkError, QUEUE_CAPACITY,
};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

/// Number of writes between two rotation checks
pub const ROTATION_CHECK_INTERVAL: u64 = 200;

/// Timestamp appended to rotated file names
const ROTATED_SUFFIX_FORMAT: &str = "%Y%m%d%H%M%S";

/// Appends encoded events to a file from a dedicated worker thread.
///
/// Encoding happens on the caller's thread; only the bytes cross the queue.
/// The worker rotates the file by size and flushes everything still queued
/// when the sink shuts down.
pub struct FileSink {
    path: PathBuf,
    format: Format,
    level: Level,
    worker: QueueWorker<Vec<u8>>,
}

impl FileSink {
    pub fn new(opts: FileOptions) -> Result<Self, ConfigError> {
        let path = resolve_path(opts.path);
        let mut active = ActiveFile::new(path.clone(), opts.rotate_size_bytes);
        let worker = QueueWorker::spawn("file", QUEUE_CAPACITY, move |rx: Receiver<Vec<u8>>| {
            active.open_or_warn();
            for bytes in rx {
                active.write(&bytes);
            }
            active.close();
        })?;

        info!(path = %path.display(), format = %opts.format, "Started file sink");

        Ok(Self {
            path,
            format: opts.format,
            level: opts.level,
            worker,
        })
    }

    /// Path of the active log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Events dropped because the queue was full or the sink was shut down
    pub fn dropped(&self) -> u64 {
        self.worker.dropped()
    }
}

impl Sink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn level(&self) -> Level {
        self.level
    }

    fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        let bytes = encode(event, self.format)?;
        if self.worker.push(bytes) == Enqueue::Full {
            warn!(
                path = %self.path.display(),
                dropped = self.worker.dropped(),
                "File sink queue full, event dropped"
            );
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.worker.shutdown();
    }
}

/// Worker-side state: the open handle and rotation bookkeeping
struct ActiveFile {
    path: PathBuf,
    rotate_size_bytes: u64,
    writer: Option<BufWriter<File>>,
    writes: u64,
}

impl ActiveFile {
    fn new(path: PathBuf, rotate_size_bytes: u64) -> Self {
        Self {
            path,
            rotate_size_bytes,
            writer: None,
            writes: 0,
        }
    }

    fn open(&mut self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.writer = Some(BufWriter::new(file));

        debug!(path = %self.path.display(), "Opened log file");
        Ok(())
    }

    fn open_or_warn(&mut self) {
        if let Err(e) = self.open() {
            warn!(path = %self.path.display(), error = %e, "Failed to open log file");
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.writer.is_none() {
            self.open_or_warn();
        }

        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(e) = writer.write_all(bytes) {
            warn!(path = %self.path.display(), error = %e, "Failed to write to log file");
        }

        self.writes += 1;
        if self.writes % ROTATION_CHECK_INTERVAL == 0 {
            if let Err(e) = self.check_rotation() {
                warn!(path = %self.path.display(), error = %e, "Failed to rotate log file");
            }
        }
    }

    fn check_rotation(&mut self) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        writer.flush()?;
        let size = writer.get_ref().metadata()?.len();
        if size > self.rotate_size_bytes {
            self.rotate()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let rotated = rotated_path(&self.path);
        fs::rename(&self.path, &rotated)?;
        info!(
            from = %self.path.display(),
            to = %rotated.display(),
            "Rotated log file"
        );

        self.open()
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!(path = %self.path.display(), error = %e, "Failed to flush log file");
            }
        }
        debug!(path = %self.path.display(), writes = self.writes, "Closed log file");
    }
}

fn resolve_path(path: PathBuf) -> PathBuf {
    if path.as_os_str().is_empty() {
        FileOptions::default().path
    } else {
        path
    }
}

/// `<path>.<YYYYMMDDHHMMSS>.log`, with a counter when that name is taken
fn rotated_path(path: &Path) -> PathBuf {
    let stamp = Local::now().format(ROTATED_SUFFIX_FORMAT).to_string();
    let base = path.as_os_str().to_string_lossy().into_owned();

    let candidate = PathBuf::from(format!("{}.{}.log", base, stamp));
    if !candidate.exists() {
        return candidate;
    }

    (1u32..)
        .map(|n| PathBuf::from(format!("{}.{}-{}.log", base, stamp, n)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
