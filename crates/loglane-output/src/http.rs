//! HTTP sink: one request per event, sent from a dedicated worker.
//!
//! Delivery is best-effort and at-most-once. The worker owns a
//! current-thread tokio runtime and drives an async `reqwest` client on it;
//! a non-2xx status or a transport error is logged and the event is gone.

use crate::worker::{Enqueue, QueueWorker};
use loglane_core::{
    encode, ConfigError, Event, Format, HttpOptions, Level, Sink, SinkError, QUEUE_CAPACITY,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on a single request, connect included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Methods accepted in [`HttpOptions::method`]
pub const ALLOWED_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "HEAD"];

const DEFAULT_METHOD: Method = Method::PUT;

pub struct HttpSink {
    url: Url,
    method: Method,
    level: Level,
    worker: QueueWorker<Event>,
}

impl HttpSink {
    /// Validate the options and start the worker
    pub fn new(opts: HttpOptions) -> Result<Self, ConfigError> {
        let url = parse_url(&opts.url)?;
        let method = parse_method(&opts.method)?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| ConfigError::Worker { sink: "http", source })?;

        let request = RequestTemplate {
            client,
            url: url.clone(),
            method: method.clone(),
            format: opts.format,
            bearer_token: opts.bearer_token,
        };

        let worker = QueueWorker::spawn("http", QUEUE_CAPACITY, move |rx: Receiver<Event>| {
            for event in rx {
                if let Err(e) = runtime.block_on(request.send(&event)) {
                    warn!(url = %request.url, error = %e, "HTTP sink dropped event");
                }
            }
        })?;

        info!(url = %url, method = %method, format = %opts.format, "Started HTTP sink");

        Ok(Self {
            url,
            method,
            level: opts.level,
            worker,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Events dropped because the queue was full or the sink was shut down
    pub fn dropped(&self) -> u64 {
        self.worker.dropped()
    }
}

impl Sink for HttpSink {
    fn name(&self) -> &'static str {
        "http"
    }

    fn level(&self) -> Level {
        self.level
    }

    fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        if self.worker.push(event.clone()) == Enqueue::Full {
            warn!(
                url = %self.url,
                dropped = self.worker.dropped(),
                "HTTP sink queue full, event dropped"
            );
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.worker.shutdown();
    }
}

/// Everything the worker needs to turn an event into a request
struct RequestTemplate {
    client: Client,
    url: Url,
    method: Method,
    format: Format,
    bearer_token: Option<String>,
}

impl RequestTemplate {
    async fn send(&self, event: &Event) -> Result<(), SinkError> {
        let body = encode(event, self.format)?;
        let content_type = match self.format {
            Format::Json => "application/json",
            Format::Text | Format::Ansi => "text/plain; charset=utf-8",
        };

        let mut request = self
            .client
            .request(self.method.clone(), self.url.clone())
            .header(CONTENT_TYPE, content_type)
            .body(body);
        if let Some(token) = &self.bearer_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SinkError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status(status.as_u16()));
        }

        debug!(status = %status, "Delivered event over HTTP");
        Ok(())
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_method(raw: &str) -> Result<Method, ConfigError> {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return Ok(DEFAULT_METHOD);
    }
    if !ALLOWED_METHODS.contains(&upper.as_str()) {
        return Err(ConfigError::UnsupportedMethod(raw.to_string()));
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|_| ConfigError::UnsupportedMethod(raw.to_string()))
}
