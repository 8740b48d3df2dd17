use std::io::{self, Write};

use super::{Format, FormatOptions, Record, format_time};
use crate::keys::{CALLSTACK_KEY, LEVEL_KEY, MESSAGE_KEY, NAME_KEY, TIME_KEY};

/// Renders each record as a single-line JSON object.
///
/// The reserved keys come first, followed by the record fields in the order they were given, and
/// the caller location (if any) last.
#[derive(Debug)]
pub struct JsonFormatter {
    options: FormatOptions,
}

impl JsonFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }
}

impl Format for JsonFormatter {
    fn format(&mut self, buf: &mut Vec<u8>, record: &Record<'_>) -> io::Result<()> {
        let time = format_time(record.time(), &self.options.time_format)?;

        buf.push(b'{');
        write_entry(buf, TIME_KEY, &time)?;
        buf.push(b',');
        write_entry(buf, LEVEL_KEY, record.level().as_str())?;
        buf.push(b',');
        write_entry(buf, NAME_KEY, record.name())?;
        buf.push(b',');
        write_entry(buf, MESSAGE_KEY, record.message())?;
        for field in record.fields() {
            buf.push(b',');
            serde_json::to_writer(&mut *buf, field.key())?;
            buf.push(b':');
            serde_json::to_writer(&mut *buf, field.value())?;
        }
        if let Some(caller) = record.caller() {
            buf.push(b',');
            write_entry(buf, CALLSTACK_KEY, caller)?;
        }
        buf.write_all(b"}\n")
    }
}

fn write_entry(buf: &mut Vec<u8>, key: &str, value: &str) -> io::Result<()> {
    serde_json::to_writer(&mut *buf, key)?;
    buf.push(b':');
    serde_json::to_writer(&mut *buf, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::JsonFormatter;
    use crate::{
        Level,
        fmt::{Field, Format, FormatOptions, Record, testing::fixed_time},
    };

    fn render(record: Record<'_>) -> String {
        let mut format = JsonFormatter::new(FormatOptions::default());
        let mut buf = Vec::new();
        format.format(&mut buf, &record).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn render_record() {
        let fields = [Field::new("port", 8080), Field::new("host", "local \"host\"")];
        let rendered = render(
            Record::new(Level::Warn, "server", "listening")
                .with_time(fixed_time())
                .with_fields(&fields),
        );
        assert_eq!(
            rendered,
            concat!(
                r#"{"_t":"2024-03-01T12:30:45+0000","_l":"WRN","_n":"server","_m":"listening","#,
                r#""port":8080,"host":"local \"host\""}"#,
                "\n"
            )
        );
    }

    #[test]
    fn render_caller_and_parse_back() {
        let fields = [Field::new("attempt", json!({ "n": 3 }))];
        let rendered = render(
            Record::new(Level::Error, "db", "connection lost")
                .with_time(fixed_time())
                .with_fields(&fields)
                .with_caller(Some("src/db.rs:42")),
        );
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            value,
            json!({
                "_t": "2024-03-01T12:30:45+0000",
                "_l": "ERR",
                "_n": "db",
                "_m": "connection lost",
                "attempt": { "n": 3 },
                "_c": "src/db.rs:42",
            })
        );
    }
}
