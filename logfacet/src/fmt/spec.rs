use jiff::{Timestamp, tz::TimeZone};

use super::{FormatId, format_time};
use crate::filter::ParseError;

/// The parsed form of a format selection string, e.g. `happy,t=%H:%M:%S,maxcol=120`.
///
/// The one entry without a `=` names the format. The remaining entries are options:
///
/// * `t=<strftime>`, the timestamp format
/// * `maxcol=<n>`, the column at which the `happy` format wraps fields
///
/// Anything left unspecified falls back to the terminal-dependent defaults. Whether the named
/// format actually exists is only known once all formats are registered, so it is checked later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSpec {
    pub format: Option<FormatId>,
    pub time_format: Option<String>,
    pub max_col: Option<usize>,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        let mut result = Self::default();

        for entry in spec.split(',').map(|s| s.trim()) {
            if entry.is_empty() {
                continue;
            }
            match entry.split_once('=').map(|(key, value)| (key.trim(), value.trim())) {
                None => {
                    if let Some(format) = result.format.as_ref() {
                        return Err(ParseError::new(format!(
                            "invalid format spec '{spec}': format '{format}' was already selected"
                        )));
                    }
                    result.format = Some(FormatId::new(entry.to_ascii_lowercase()));
                }
                Some(("t", time_format)) => {
                    let time = Timestamp::UNIX_EPOCH.to_zoned(TimeZone::UTC);
                    format_time(&time, time_format).map_err(|err| {
                        ParseError::new(format!("invalid format spec '{spec}': {err}"))
                    })?;
                    result.time_format = Some(time_format.to_owned());
                }
                Some(("maxcol", max_col)) => {
                    let max_col = max_col.parse::<usize>().map_err(|err| {
                        ParseError::new(format!("invalid format spec '{spec}': maxcol: {err}"))
                    })?;
                    result.max_col = Some(max_col);
                }
                Some((option, _)) => {
                    return Err(ParseError::new(format!(
                        "invalid format spec '{spec}': unknown option '{option}'"
                    )));
                }
            }
        }

        Ok(result)
    }
}
