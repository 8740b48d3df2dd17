use std::io::{self, Write};

use super::{Format, FormatOptions, Record, format_time, write_styled, write_value};
use crate::Level;

/// A human-oriented format, styled according to the configured [super::ColorScheme].
///
/// Records are written on a single line while they fit within `max_col` columns. Beyond that,
/// each field goes on its own indented line.
#[derive(Debug)]
pub struct HappyFormatter {
    options: FormatOptions,
    /// Rendered field values, reused between records
    values: Vec<Vec<u8>>,
}

impl HappyFormatter {
    const INDENT: &'static str = "   ";

    pub fn new(options: FormatOptions) -> Self {
        Self {
            options,
            values: Vec::new(),
        }
    }
}

impl Format for HappyFormatter {
    fn format(&mut self, buf: &mut Vec<u8>, record: &Record<'_>) -> io::Result<()> {
        let Self { options, values } = self;
        let colors = options.colors;
        let scheme = &options.scheme;
        let time = format_time(record.time(), &options.time_format)?;

        values.resize_with(record.fields().len(), Vec::new);
        let mut width = time.chars().count()
            + record.name().chars().count()
            + record.message().chars().count()
            + 6;
        for (field, value) in record.fields().iter().zip(values.iter_mut()) {
            value.clear();
            write_value(value, field.value())?;
            width += field.key().chars().count() + value.len() + 3;
        }
        if let Some(caller) = record.caller() {
            width += caller.chars().count() + 3;
        }
        let wrap = !record.fields().is_empty() && width > options.max_col;

        write_styled(buf, colors, scheme.misc, &time)?;
        buf.push(b' ');
        write_styled(buf, colors, scheme.level(record.level()), record.level().as_str())?;
        buf.push(b' ');
        write_styled(buf, colors, scheme.misc, record.name())?;
        buf.push(b' ');
        if record.level() >= Level::Error {
            write_styled(buf, colors, scheme.error, record.message())?;
        } else {
            buf.extend_from_slice(record.message().as_bytes());
        }

        for (field, value) in record.fields().iter().zip(values.iter()) {
            if wrap {
                write!(buf, "\n{}", Self::INDENT)?;
            } else {
                buf.push(b' ');
            }
            write_styled(buf, colors, scheme.key, field.key())?;
            buf.extend_from_slice(b": ");
            let value = String::from_utf8_lossy(value);
            write_styled(buf, colors, scheme.value, &value)?;
        }

        if let Some(caller) = record.caller() {
            if wrap {
                write!(buf, "\n{}", Self::INDENT)?;
            } else {
                buf.push(b' ');
            }
            buf.extend_from_slice(b"@ ");
            write_styled(buf, colors, scheme.source, caller)?;
        }

        buf.write_all(b"\n")
    }
}
