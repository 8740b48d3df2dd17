use std::{error::Error, fmt, str::FromStr};

/// The verbosity of a record, or the threshold configured for a logger.
///
/// Levels are totally ordered: `Debug < Info < Warn < Error < Off`. A record at level `L` is
/// emitted by a logger configured at level `C` iff `L >= C`, unless `C` is [Level::Off], which
/// suppresses everything.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl Level {
    /// All levels, from most to least verbose
    pub const ALL: [Level; 5] = [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Off];

    /// The short token used for this level in configuration strings and rendered records
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warn => "WRN",
            Self::Error => "ERR",
            Self::Off => "OFF",
        }
    }

    /// Returns true if a record at this level passes a logger whose threshold is `threshold`.
    #[inline]
    pub fn is_enabled_for(self, threshold: Level) -> bool {
        threshold != Level::Off && self != Level::Off && self >= threshold
    }

    /// The most verbose `log::LevelFilter` which still reaches a logger configured at this level
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            // `log` has one more verbose level than we do, and it folds into `Debug`
            Self::Debug => log::LevelFilter::Trace,
            Self::Info => log::LevelFilter::Info,
            Self::Warn => log::LevelFilter::Warn,
            Self::Error => log::LevelFilter::Error,
            Self::Off => log::LevelFilter::Off,
        }
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => Self::Debug,
            log::Level::Info => Self::Info,
            log::Level::Warn => Self::Warn,
            log::Level::Error => Self::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAMES: [(&str, &str, Level); 5] = [
            ("DBG", "DEBUG", Level::Debug),
            ("INF", "INFO", Level::Info),
            ("WRN", "WARN", Level::Warn),
            ("ERR", "ERROR", Level::Error),
            ("OFF", "OFF", Level::Off),
        ];

        NAMES
            .iter()
            .find(|(short, long, _)| s.eq_ignore_ascii_case(short) || s.eq_ignore_ascii_case(long))
            .map(|(_, _, level)| *level)
            .ok_or(ParseLevelError(()))
    }
}

/// The error returned when a string is not a recognized [Level] token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseLevelError(());

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("attempted to convert a string that doesn't match an existing log level")
    }
}

impl Error for ParseLevelError {}
