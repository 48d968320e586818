use crate::encoding::Format;
use crate::error::ConfigError;
use crate::event::Level;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Capacity of the internal queue of every worker-backed sink
pub const QUEUE_CAPACITY: usize = 100;

/// Default rotation threshold of the file sink (100 MiB)
pub const DEFAULT_ROTATE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Main configuration for a dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Number of recent events kept for introspection
    pub history_capacity: usize,

    /// Sinks, in registration order
    pub sinks: Vec<SinkConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            sinks: vec![SinkConfig::Console(ConsoleOptions::default())],
        }
    }
}

impl LogConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// One configured sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Console(ConsoleOptions),
    File(FileOptions),
    Http(HttpOptions),
}

/// Standard stream a console sink writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    #[serde(alias = "out")]
    Stdout,
    #[serde(alias = "err")]
    Stderr,
}

impl Default for Stream {
    fn default() -> Self {
        Self::Stdout
    }
}

/// Console sink options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleOptions {
    pub stream: Stream,
    pub format: Format,
    pub level: Level,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            stream: Stream::Stdout,
            format: Format::Ansi,
            level: Level::Info,
        }
    }
}

/// File sink options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    /// Active log file; missing parent directories are created
    pub path: PathBuf,
    pub format: Format,
    pub level: Level,
    /// Size after which the active file is renamed and a fresh one opened
    pub rotate_size_bytes: u64,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/loglane.log"),
            format: Format::Json,
            level: Level::Info,
            rotate_size_bytes: DEFAULT_ROTATE_SIZE_BYTES,
        }
    }
}

impl FileOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// HTTP sink options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
    pub url: String,
    /// HTTP method; empty means PUT
    pub method: String,
    pub format: Format,
    pub level: Level,
    /// Sent as `Authorization: Bearer <token>` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: String::new(),
            format: Format::Json,
            level: Level::Info,
            bearer_token: None,
        }
    }
}

impl HttpOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.history_capacity, 1000);
        assert_eq!(config.sinks.len(), 1);
        match &config.sinks[0] {
            SinkConfig::Console(opts) => {
                assert_eq!(opts.stream, Stream::Stdout);
                assert_eq!(opts.format, Format::Ansi);
                assert_eq!(opts.level, Level::Info);
            }
            other => panic!("expected console sink, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = LogConfig::from_str("history_capacity = 20\n").unwrap();
        assert_eq!(config.history_capacity, 20);
        // Defaults should be applied
        assert_eq!(config.sinks.len(), 1);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
history_capacity = 500

[[sinks]]
type = "console"
stream = "err"
format = "text"
level = "debug"

[[sinks]]
type = "file"
path = "/var/log/app/app.log"
rotate_size_bytes = 4096

[[sinks]]
type = "http"
url = "https://ingest.example.com/logs"
method = "POST"
level = "warn"
bearer_token = "secret"
"#;
        let config = LogConfig::from_str(toml).unwrap();
        assert_eq!(config.history_capacity, 500);
        assert_eq!(config.sinks.len(), 3);

        assert_eq!(
            config.sinks[0],
            SinkConfig::Console(ConsoleOptions {
                stream: Stream::Stderr,
                format: Format::Text,
                level: Level::Debug,
            })
        );

        match &config.sinks[1] {
            SinkConfig::File(opts) => {
                assert_eq!(opts.path, PathBuf::from("/var/log/app/app.log"));
                assert_eq!(opts.rotate_size_bytes, 4096);
                assert_eq!(opts.format, Format::Json);
                assert_eq!(opts.level, Level::Info);
            }
            other => panic!("expected file sink, got {:?}", other),
        }

        match &config.sinks[2] {
            SinkConfig::Http(opts) => {
                assert_eq!(opts.method, "POST");
                assert_eq!(opts.level, Level::Warn);
                assert_eq!(opts.bearer_token.as_deref(), Some("secret"));
            }
            other => panic!("expected http sink, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_sink_type_is_rejected() {
        let toml = r#"
[[sinks]]
type = "syslog"
"#;
        assert!(matches!(LogConfig::from_str(toml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_serialize_to_toml() {
        let mut config = LogConfig::default();
        config.sinks.push(SinkConfig::File(FileOptions::new("out.log")));

        let toml = config.to_toml().unwrap();
        assert!(toml.contains("history_capacity"));
        assert!(toml.contains("type = \"file\""));

        let parsed = LogConfig::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("loglane.toml");
        std::fs::write(&path, "history_capacity = 3\nsinks = []\n").unwrap();

        let config = LogConfig::from_file(&path).unwrap();
        assert_eq!(config.history_capacity, 3);
        assert!(config.sinks.is_empty());

        assert!(matches!(
            LogConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::Read(_))
        ));
    }
}
