use crate::encoding;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Display format of [`Event::time`]
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Severity used for routing: a sink receives every event whose level is at
/// or above its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl Level {
    /// Parse a level name, falling back to `Info` for anything unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "error" => Self::Error,
            "fatal" => Self::Fatal,
            "panic" => Self::Panic,
            _ => Self::Info,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Info
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "debug"),
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warn"),
            Level::Error => write!(f, "error"),
            Level::Fatal => write!(f, "fatal"),
            Level::Panic => write!(f, "panic"),
        }
    }
}

/// Which emission call produced an event.
///
/// Every kind maps onto a [`Level`]; `Stat` is an info-level kind with its
/// own label and color so statistics lines stand out in styled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "DBUG")]
    Debug,
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "WARN")]
    Warn,
    #[serde(rename = "EROR")]
    Error,
    #[serde(rename = "FTAL")]
    Fatal,
    #[serde(rename = "STAT")]
    Stat,
    #[serde(rename = "PANC")]
    Panic,
}

impl Kind {
    pub fn level(self) -> Level {
        match self {
            Kind::Debug => Level::Debug,
            Kind::Info | Kind::Stat => Level::Info,
            Kind::Warn => Level::Warn,
            Kind::Error => Level::Error,
            Kind::Fatal => Level::Fatal,
            Kind::Panic => Level::Panic,
        }
    }

    /// Four-letter label shown in text output and stored as `level` in JSON
    pub fn label(self) -> &'static str {
        match self {
            Kind::Debug => "DBUG",
            Kind::Info => "INFO",
            Kind::Warn => "WARN",
            Kind::Error => "EROR",
            Kind::Fatal => "FTAL",
            Kind::Stat => "STAT",
            Kind::Panic => "PANC",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Kind::Debug => encoding::COLOR_YELLOW,
            Kind::Info => encoding::COLOR_BLUE,
            Kind::Warn => encoding::COLOR_ORANGE,
            Kind::Error => encoding::COLOR_RED,
            Kind::Fatal => encoding::COLOR_PURPLE,
            Kind::Stat => encoding::COLOR_GREEN,
            Kind::Panic => encoding::COLOR_PINK,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One logged occurrence.
///
/// Built once by the dispatcher and never mutated afterwards. Cloning gives a
/// fully independent copy (the field map is owned), which is how events cross
/// into the history buffer, sink queues and relay channels.
///
/// The JSON shape is `{level, time, timestamp, msg, args}`; the color token
/// and the precomputed styled line are presentation only and are rebuilt when
/// an event is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventRecord")]
pub struct Event {
    #[serde(rename = "level")]
    kind: Kind,
    time: String,
    timestamp: DateTime<Local>,
    msg: String,
    args: BTreeMap<String, Value>,
    #[serde(skip)]
    line: String,
}

/// Wire shape of an event, used to rebuild the derived parts on decode
#[derive(Deserialize)]
struct EventRecord {
    level: Kind,
    time: String,
    timestamp: DateTime<Local>,
    msg: String,
    #[serde(default)]
    args: Option<BTreeMap<String, Value>>,
}

impl From<EventRecord> for Event {
    fn from(record: EventRecord) -> Self {
        Self::assemble(
            record.level,
            record.timestamp,
            record.time,
            record.msg,
            record.args.unwrap_or_default(),
        )
    }
}

impl Event {
    /// Create an event stamped with the current local time
    pub fn new(kind: Kind, msg: impl Into<String>, args: Vec<Value>) -> Self {
        Self::at(kind, Local::now(), msg, args)
    }

    /// Create an event with an explicit timestamp
    pub fn at(
        kind: Kind,
        timestamp: DateTime<Local>,
        msg: impl Into<String>,
        args: Vec<Value>,
    ) -> Self {
        let time = timestamp.format(TIME_FORMAT).to_string();
        Self::assemble(kind, timestamp, time, msg.into(), fields_from_args(args))
    }

    fn assemble(
        kind: Kind,
        timestamp: DateTime<Local>,
        time: String,
        msg: String,
        args: BTreeMap<String, Value>,
    ) -> Self {
        let line = encoding::render_line(kind, &time, &msg, &args);
        Self {
            kind,
            time,
            timestamp,
            msg,
            args,
            line,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn level(&self) -> Level {
        self.kind.level()
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn color(&self) -> &'static str {
        self.kind.color()
    }

    /// Display timestamp, millisecond precision
    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Keyed fields, iterated in sorted key order
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.args
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Precomputed styled line, terminated by a newline
    pub fn line(&self) -> &str {
        &self.line
    }
}

/// Build a field map from a flat `key, value, key, value, ...` list.
///
/// Never fails: a trailing key without a value maps to null, and a key that
/// is not a string is replaced by `arg<index>` (its position in the list).
/// Later duplicates overwrite earlier ones.
pub fn fields_from_args(args: Vec<Value>) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    let mut iter = args.into_iter().enumerate();

    while let Some((index, key)) = iter.next() {
        let key = match key {
            Value::String(s) => s,
            _ => format!("arg{}", index),
        };
        let value = iter.next().map(|(_, v)| v).unwrap_or(Value::Null);
        fields.insert(key, value);
    }

    fields
}
