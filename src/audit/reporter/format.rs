//! Log record layouts for `env_logger`.
//!
//! Both layouts render the key/value fields attached to a record, which is
//! how the reporter carries `type`, `namespace`, `name` and check payloads.

use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use log::kv::{self, Key, Value, VisitSource};
use log::{Level, Record};
use serde_json::{Map, Value as JsonValue};
use std::io::{self, Write};

/// Log output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `TIME LEVEL message key=value ...`
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Plain }
    }

    /// Write one record in this layout. `color` only affects plain output.
    pub fn write(&self, out: &mut dyn Write, record: &Record<'_>, color: bool) -> io::Result<()> {
        match self {
            Self::Plain => writeln!(out, "{}", plain_line(record, color)),
            Self::Json => writeln!(out, "{}", json_line(record)),
        }
    }
}

/// Collects key/value pairs in insertion order.
struct Fields(Vec<(String, String)>);

impl<'kvs> VisitSource<'kvs> for Fields {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.0.push((key.as_str().to_string(), value.to_string()));
        Ok(())
    }
}

fn fields(record: &Record<'_>) -> Vec<(String, String)> {
    let mut fields = Fields(Vec::new());
    // Fields never rejects a pair.
    let _ = record.key_values().visit(&mut fields);
    fields.0
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn level_label(level: Level, color: bool) -> String {
    let label = format!("{:<5}", level.as_str());
    if !color {
        return label;
    }
    match level {
        Level::Error => label.red().bold().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Info => label.green().to_string(),
        Level::Debug | Level::Trace => label.dimmed().to_string(),
    }
}

fn quote_if_needed(value: &str) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) || value.contains('"') {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}

/// Render a record as a single plain-text line.
pub fn plain_line(record: &Record<'_>, color: bool) -> String {
    let mut line = format!(
        "{} {} {}",
        timestamp(),
        level_label(record.level(), color),
        record.args()
    );
    for (key, value) in fields(record) {
        line.push_str(&format!(" {}={}", key, quote_if_needed(&value)));
    }
    line
}

/// Render a record as a single JSON object.
pub fn json_line(record: &Record<'_>) -> String {
    let mut object = Map::new();
    object.insert("time".to_string(), JsonValue::String(timestamp()));
    object.insert(
        "level".to_string(),
        JsonValue::String(record.level().as_str().to_lowercase()),
    );
    object.insert("msg".to_string(), JsonValue::String(record.args().to_string()));
    for (key, value) in fields(record) {
        object.insert(key, JsonValue::String(value));
    }
    JsonValue::Object(object).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_record<T>(f: impl FnOnce(&Record<'_>) -> T) -> T {
        let kvs: &[(&str, &str)] = &[("type", "Pod"), ("namespace", "default"), ("name", "web app")];
        f(&Record::builder()
            .args(format_args!("something happened"))
            .level(Level::Warn)
            .key_values(&kvs)
            .build())
    }

    #[test]
    fn test_plain_line_renders_fields() {
        let line = with_record(|r| plain_line(r, false));
        assert!(line.contains("WARN  something happened"));
        assert!(line.ends_with(r#"type=Pod namespace=default name="web app""#));
    }

    #[test]
    fn test_json_line_is_flat_object() {
        let line = with_record(json_line);
        let value: JsonValue = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "warn");
        assert_eq!(value["msg"], "something happened");
        assert_eq!(value["type"], "Pod");
        assert_eq!(value["name"], "web app");
        assert!(value["time"].as_str().is_some());
    }

    #[test]
    fn test_empty_value_is_quoted() {
        assert_eq!(quote_if_needed(""), r#""""#);
        assert_eq!(quote_if_needed("plain"), "plain");
    }
}
