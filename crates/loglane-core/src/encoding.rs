//! Rendering of events into bytes or interchange values.
//!
//! Every event carries one precomputed styled line. The plain-text format is
//! that line with its ANSI escape codes removed, so both text formats always
//! agree on layout.

use crate::error::SinkError;
use crate::event::{Event, Kind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::OnceLock;
use unicode_width::UnicodeWidthStr;

pub const COLOR_GREEN: &str = "\x1b[32m";
pub const COLOR_BLUE: &str = "\x1b[34m";
pub const COLOR_RED: &str = "\x1b[31m";
pub const COLOR_ORANGE: &str = "\x1b[33m";
pub const COLOR_PURPLE: &str = "\x1b[35m";
pub const COLOR_YELLOW: &str = "\x1b[93m";
pub const COLOR_PINK: &str = "\x1b[95m";
pub const COLOR_WHITE: &str = "\x1b[0m";
pub const FONT_BOLD: &str = "\x1b[1m";
pub const FONT_NORMAL: &str = "\x1b[0m";

/// Column the message is padded to in text output
pub const PAD_WIDTH: usize = 60;

/// Output encoding of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// One JSON object per line
    Json,
    /// Styled line with escape codes stripped
    Text,
    /// Styled line with ANSI colors
    Ansi,
}

impl Format {
    /// Parse a format name, falling back to `Text` for anything unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "ansi" => Self::Ansi,
            _ => Self::Text,
        }
    }

    pub fn is_valid(s: &str) -> bool {
        matches!(s, "json" | "text" | "ansi")
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Text => write!(f, "text"),
            Format::Ansi => write!(f, "ansi"),
        }
    }
}

static ANSI_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_ansi_regex() -> &'static Regex {
    ANSI_REGEX.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap())
}

/// Remove ANSI color/style sequences
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    get_ansi_regex().replace_all(s, "")
}

/// Encode an event for a byte-oriented destination
pub fn encode(event: &Event, format: Format) -> Result<Vec<u8>, SinkError> {
    match format {
        Format::Json => {
            let mut bytes = serde_json::to_vec(event)?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        Format::Text => Ok(strip_ansi(event.line()).into_owned().into_bytes()),
        Format::Ansi => Ok(event.line().as_bytes().to_vec()),
    }
}

/// Encode an event as an interchange value, for introspection APIs
pub fn encode_value(event: &Event, format: Format) -> Value {
    match format {
        Format::Json => serde_json::to_value(event).unwrap_or(Value::Null),
        Format::Ansi => Value::String(event.line().to_string()),
        Format::Text => Value::String(strip_ansi(event.line()).into_owned()),
    }
}

/// Build the styled single-line representation of an event
pub fn render_line(kind: Kind, time: &str, msg: &str, fields: &BTreeMap<String, Value>) -> String {
    let mut line = String::with_capacity(PAD_WIDTH + 64);

    line.push_str(FONT_BOLD);
    line.push_str(kind.color());
    line.push('[');
    line.push_str(kind.label());
    line.push(']');
    line.push_str(FONT_NORMAL);
    line.push_str(COLOR_WHITE);
    line.push_str(" [");
    line.push_str(time);
    line.push(']');
    line.push_str(&pad(msg));
    line.push_str(COLOR_WHITE);

    for (key, value) in fields {
        let _ = write!(line, " {}={}", key, display_value(value));
    }

    line.push('\n');
    line
}

/// Left-align a message after a leading space to `PAD_WIDTH` display
/// columns, never truncating
fn pad(msg: &str) -> String {
    let mut padded = format!(" {}", msg);
    let width = padded.width();
    if width < PAD_WIDTH {
        padded.extend(std::iter::repeat(' ').take(PAD_WIDTH - width));
    }
    padded
}

/// Human-readable rendering of a field value
pub fn display_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed("<nil>"),
        other => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Event {
        Event::new(
            Kind::Info,
            "user logged in",
            vec![json!("user"), json!("alice"), json!("attempt"), json!(2), json!("admin")],
        )
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("json"), Format::Json);
        assert_eq!(Format::parse("ansi"), Format::Ansi);
        assert_eq!(Format::parse("text"), Format::Text);
        assert_eq!(Format::parse("yaml"), Format::Text);
        assert!(Format::is_valid("json"));
        assert!(!Format::is_valid("JSON"));
    }

    #[test]
    fn test_strip_ansi() {
        let styled = format!("{}{}[INFO]{} hello", FONT_BOLD, COLOR_BLUE, FONT_NORMAL);
        assert_eq!(strip_ansi(&styled), "[INFO] hello");
        assert_eq!(strip_ansi("no codes"), "no codes");
    }

    #[test]
    fn test_text_line_layout() {
        let event = sample();
        let text = String::from_utf8(encode(&event, Format::Text).unwrap()).unwrap();

        let expected_prefix = format!("[INFO] [{}] user logged in", event.time());
        assert!(text.starts_with(&expected_prefix));
        assert!(text.ends_with(" admin=<nil> attempt=2 user=alice\n"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_fields_render_sorted() {
        let event = Event::new(
            Kind::Debug,
            "m",
            vec![json!("zeta"), json!(1), json!("alpha"), json!(2)],
        );
        let text = strip_ansi(event.line()).into_owned();
        let alpha = text.find("alpha=2").unwrap();
        let zeta = text.find("zeta=1").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_message_padding() {
        let short = pad("hi");
        assert_eq!(short.width(), PAD_WIDTH);
        assert!(short.starts_with(" hi"));

        let long_msg = "x".repeat(PAD_WIDTH + 10);
        let long = pad(&long_msg);
        assert_eq!(long, format!(" {}", long_msg));
    }

    #[test]
    fn test_padding_counts_display_columns() {
        let wide = pad("日本語");
        assert_eq!(wide.width(), PAD_WIDTH);
        assert_eq!(wide.chars().count(), PAD_WIDTH - 3);

        let emoji = pad("deploy 🚀 done");
        assert_eq!(emoji.width(), PAD_WIDTH);
    }

    #[test]
    fn test_fields_align_for_wide_messages() {
        let narrow = Event::new(Kind::Info, "abcdef", vec![json!("k"), json!(1)]);
        let wide = Event::new(Kind::Info, "日本語", vec![json!("k"), json!(1)]);

        let column = |event: &Event| {
            let text = strip_ansi(event.line()).into_owned();
            let at = text.find(" k=1").unwrap();
            text[..at].width()
        };
        assert_eq!(column(&narrow), column(&wide));
    }

    #[test]
    fn test_ansi_keeps_colors() {
        let event = sample();
        let ansi = String::from_utf8(encode(&event, Format::Ansi).unwrap()).unwrap();
        assert!(ansi.starts_with(FONT_BOLD));
        assert!(ansi.contains(COLOR_BLUE));
    }

    #[test]
    fn test_json_line_roundtrip() {
        let event = sample();
        let bytes = encode(&event, Format::Json).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));

        let decoded: Event = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded.label(), event.label());
        assert_eq!(decoded.message(), event.message());
        assert_eq!(decoded.timestamp(), event.timestamp());
        assert_eq!(decoded.fields(), event.fields());
    }

    #[test]
    fn test_encode_value() {
        let event = sample();
        assert_eq!(encode_value(&event, Format::Json)["msg"], json!("user logged in"));
        assert_eq!(encode_value(&event, Format::Ansi), json!(event.line()));
        let text = encode_value(&event, Format::Text);
        assert!(!text.as_str().unwrap().contains('\x1b'));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("raw")), "raw");
        assert_eq!(display_value(&Value::Null), "<nil>");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
    }
}
