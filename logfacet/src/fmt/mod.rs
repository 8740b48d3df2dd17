//! Formatting for log records.
//!
//! A [Format] turns a [Record] into bytes. Formats are not shared: every logger gets its own
//! instance, built from a factory in the [FormatRegistry] when the logger is first requested, so a
//! format may keep per-logger state between records.
//!
//! Three formats are registered by default:
//!
//! * `happy`, a colored, human-oriented layout used by default on interactive terminals
//! * `text`, plain `key=value` pairs
//! * `json`, one JSON object per line, used by default when output is not a terminal
//!
//! ## Using a custom format
//!
//! ```
//! use std::io::{self, Write};
//!
//! use logfacet::fmt::{Format, FormatId, Record};
//!
//! struct Terse;
//!
//! impl Format for Terse {
//!     fn format(&mut self, buf: &mut Vec<u8>, record: &Record<'_>) -> io::Result<()> {
//!         writeln!(buf, "{} {}", record.level(), record.message())
//!     }
//! }
//!
//! let mut builder = logfacet::Builder::new();
//! builder
//!     .register_format(FormatId::new("terse"), |_name, _options| Box::new(Terse))
//!     .parse_format("terse");
//! let logging = builder.try_build().unwrap();
//! assert_eq!(logging.default_logger().format().as_str(), "terse");
//! ```

mod happy;
mod json;
mod registry;
mod scheme;
mod spec;
mod text;

use std::{borrow::Cow, fmt, io};

use jiff::Zoned;
pub use serde_json::Value;

pub use self::{
    happy::HappyFormatter,
    json::JsonFormatter,
    registry::{FormatFactory, FormatRegistry},
    scheme::ColorScheme,
    spec::FormatSpec,
    text::TextFormatter,
};
use crate::Level;

/// Renders records for a single logger.
pub trait Format: Send {
    /// Append the rendering of `record`, including any trailing newline, to `buf`.
    fn format(&mut self, buf: &mut Vec<u8>, record: &Record<'_>) -> io::Result<()>;
}

impl<F: Format + ?Sized> Format for Box<F> {
    fn format(&mut self, buf: &mut Vec<u8>, record: &Record<'_>) -> io::Result<()> {
        (**self).format(buf, record)
    }
}

/// Identifies a format in the [FormatRegistry].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatId(Cow<'static, str>);

impl FormatId {
    pub const HAPPY: Self = Self(Cow::Borrowed("happy"));
    pub const JSON: Self = Self(Cow::Borrowed("json"));
    pub const TEXT: Self = Self(Cow::Borrowed("text"));

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FormatId {
    fn from(id: &'static str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FormatId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// The settings every format is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// A `strftime`-style format for record timestamps
    pub time_format: String,
    /// The column at which human-oriented formats start wrapping fields
    pub max_col: usize,
    /// Whether styles from [FormatOptions::scheme] should be emitted
    pub colors: bool,
    pub scheme: ColorScheme,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            time_format: "%Y-%m-%dT%H:%M:%S%z".to_string(),
            max_col: 80,
            colors: false,
            scheme: ColorScheme::default(),
        }
    }
}

/// A structured field attached to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    key: Cow<'a, str>,
    value: Value,
}

impl<'a> Field<'a> {
    pub fn new(key: impl Into<Cow<'a, str>>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A log record, as handed to a [Format].
#[derive(Debug, Clone)]
pub struct Record<'a> {
    level: Level,
    name: &'a str,
    message: &'a str,
    time: Zoned,
    fields: &'a [Field<'a>],
    caller: Option<&'a str>,
}

impl<'a> Record<'a> {
    /// Create a record timestamped with the current time
    pub fn new(level: Level, name: &'a str, message: &'a str) -> Self {
        Self {
            level,
            name,
            message,
            time: Zoned::now(),
            fields: &[],
            caller: None,
        }
    }

    pub fn with_time(mut self, time: Zoned) -> Self {
        self.time = time;
        self
    }

    pub fn with_fields(mut self, fields: &'a [Field<'a>]) -> Self {
        self.fields = fields;
        self
    }

    /// Attach the source location (e.g. `src/main.rs:10`) the record was emitted from
    pub fn with_caller(mut self, caller: Option<&'a str>) -> Self {
        self.caller = caller;
        self
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the logger which emitted this record
    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    #[inline]
    pub fn message(&self) -> &'a str {
        self.message
    }

    #[inline]
    pub fn time(&self) -> &Zoned {
        &self.time
    }

    #[inline]
    pub fn fields(&self) -> &'a [Field<'a>] {
        self.fields
    }

    #[inline]
    pub fn caller(&self) -> Option<&'a str> {
        self.caller
    }
}

/// Render the record timestamp using `format`
pub(crate) fn format_time(time: &Zoned, format: &str) -> io::Result<String> {
    use core::fmt::Write;

    let mut rendered = String::new();
    write!(rendered, "{}", time.strftime(format)).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("invalid time format '{format}'"))
    })?;
    Ok(rendered)
}

/// Render a field value for the line-oriented formats.
///
/// Strings are written as-is unless they would be ambiguous, in which case they are quoted.
pub(crate) fn write_value(buf: &mut Vec<u8>, value: &Value) -> io::Result<()> {
    match value {
        Value::String(s) if !needs_quotes(s) => {
            buf.extend_from_slice(s.as_bytes());
            Ok(())
        }
        value => serde_json::to_writer(buf, value).map_err(io::Error::from),
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '='))
}

/// Write `text` using `style`, if styles are enabled
pub(crate) fn write_styled(
    buf: &mut Vec<u8>,
    colors: bool,
    style: anstyle::Style,
    text: &str,
) -> io::Result<()> {
    use std::io::Write;

    if colors && style != anstyle::Style::new() {
        write!(buf, "{style}{text}{style:#}")
    } else {
        buf.extend_from_slice(text.as_bytes());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn value(value: Value) -> String {
        let mut buf = Vec::new();
        write_value(&mut buf, &value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_values() {
        assert_eq!(value(json!("plain")), "plain");
        assert_eq!(value(json!("two words")), "\"two words\"");
        assert_eq!(value(json!("a=b")), "\"a=b\"");
        assert_eq!(value(json!("")), "\"\"");
        assert_eq!(value(json!(42)), "42");
        assert_eq!(value(json!(true)), "true");
        assert_eq!(value(json!(null)), "null");
        assert_eq!(value(json!([1, "x"])), "[1,\"x\"]");
    }

    #[test]
    fn time_rendering() {
        let time = testing::fixed_time();
        assert_eq!(format_time(&time, "%H:%M:%S").unwrap(), "12:30:45");
        assert_eq!(format_time(&time, "%Y-%m-%dT%H:%M:%S%z").unwrap(), "2024-03-01T12:30:45+0000");
    }

    #[test]
    fn styles_only_when_enabled() {
        let style = anstyle::AnsiColor::Red.on_default();
        let mut buf = Vec::new();
        write_styled(&mut buf, false, style, "x").unwrap();
        assert_eq!(buf, b"x");

        let mut buf = Vec::new();
        write_styled(&mut buf, true, style, "x").unwrap();
        assert_eq!(buf, b"\x1b[31mx\x1b[0m");
    }

    #[test]
    fn format_ids() {
        assert_eq!(FormatId::new("json"), FormatId::JSON);
        assert_eq!(FormatId::from(String::from("happy")), FormatId::HAPPY);
        assert_eq!(FormatId::TEXT.to_string(), "text");
    }
}
