use std::io::{self, Write};

use super::{Format, FormatOptions, Record, Value, format_time, write_value};
use crate::keys::{CALLSTACK_KEY, LEVEL_KEY, MESSAGE_KEY, NAME_KEY, TIME_KEY};

/// Renders each record as a line of plain `key=value` pairs.
///
/// This format never emits styles, which makes it the format of the internal logger.
#[derive(Debug)]
pub struct TextFormatter {
    options: FormatOptions,
}

impl TextFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }
}

impl Format for TextFormatter {
    fn format(&mut self, buf: &mut Vec<u8>, record: &Record<'_>) -> io::Result<()> {
        let time = format_time(record.time(), &self.options.time_format)?;

        write!(buf, "{TIME_KEY}={time} {LEVEL_KEY}={} {NAME_KEY}=", record.level())?;
        write_value(buf, &Value::from(record.name()))?;
        write!(buf, " {MESSAGE_KEY}=")?;
        write_value(buf, &Value::from(record.message()))?;
        for field in record.fields() {
            write!(buf, " {}=", field.key())?;
            write_value(buf, field.value())?;
        }
        if let Some(caller) = record.caller() {
            write!(buf, " {CALLSTACK_KEY}={caller}")?;
        }
        buf.write_all(b"\n")
    }
}
