use thiserror::Error;

/// Errors raised while validating sink options or loading configuration.
///
/// These only ever surface at construction time; a sink that was built
/// successfully never produces one.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to start worker for {sink} sink: {source}")]
    Worker {
        sink: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Errors raised by a single sink while delivering an event
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Endpoint returned status {0}")]
    Status(u16),
}
