use std::{
    borrow::Cow,
    fmt,
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::{
    Level,
    fmt::{Field, Format, FormatId, Record},
    keys,
    writer::Writer,
};

/// A shared handle to a named logger.
///
/// Every request for the same name from the same [crate::LoggerRegistry] returns a clone of the
/// same handle.
pub type LoggerHandle = Arc<Logger>;

/// A named logger with a fixed level and its own formatter instance.
pub struct Logger {
    name: String,
    level: Level,
    format: FormatId,
    formatter: Mutex<Box<dyn Format>>,
    writer: Arc<Writer>,
    paths: Arc<SourcePaths>,
}

impl Logger {
    pub(crate) fn new(
        name: impl Into<String>,
        level: Level,
        format: FormatId,
        formatter: Box<dyn Format>,
        writer: Arc<Writer>,
        paths: Arc<SourcePaths>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            format,
            formatter: Mutex::new(formatter),
            writer,
            paths,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The threshold below which records from this logger are discarded
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The format this logger's records are rendered with
    #[inline]
    pub fn format(&self) -> &FormatId {
        &self.format
    }

    /// Returns true if a record at `level` would be emitted by this logger
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level.is_enabled_for(self.level)
    }

    #[inline]
    pub fn is_debug(&self) -> bool {
        self.enabled(Level::Debug)
    }

    #[inline]
    pub fn is_info(&self) -> bool {
        self.enabled(Level::Info)
    }

    #[inline]
    pub fn is_warn(&self) -> bool {
        self.enabled(Level::Warn)
    }

    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Debug, message, fields)
    }

    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Info, message, fields)
    }

    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Warn, message, fields)
    }

    /// Log at [Level::Error]. Error records also carry the location of the caller.
    #[track_caller]
    pub fn error(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Error, message, fields)
    }

    /// Log `message` at `level` with the given structured fields.
    ///
    /// Fields whose key is reserved are renamed to `@<key>` rather than overwriting the
    /// structural fields of the record.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
        if !self.enabled(level) {
            return;
        }
        let location = Location::caller();
        self.write(level, message, fields, Some((location.file(), location.line())));
    }

    /// Build and emit a record on behalf of a caller at `location`.
    pub(crate) fn write(
        &self,
        level: Level,
        message: &str,
        fields: &[Field<'_>],
        location: Option<(&str, u32)>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let caller = location
            .filter(|_| level >= Level::Error)
            .map(|(file, line)| format!("{}:{line}", self.paths.shorten(file)));
        let fields = escape_reserved_keys(fields);
        let record = Record::new(level, &self.name, message)
            .with_fields(&fields)
            .with_caller(caller.as_deref());
        self.emit(&record);
    }

    /// Render and write `record` as-is, if its level is enabled.
    ///
    /// Errors while rendering or writing are discarded: there is nowhere left to report them.
    pub fn emit(&self, record: &Record<'_>) {
        if !self.enabled(record.level()) {
            return;
        }
        let mut buf = Vec::with_capacity(128);
        let rendered = self.formatter.lock().format(&mut buf, record);
        if rendered.is_ok() {
            let _ = self.writer.write(&buf);
        }
    }

    pub(crate) fn flush(&self) {
        let _ = self.writer.flush();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

fn escape_reserved_keys<'a>(fields: &'a [Field<'a>]) -> Cow<'a, [Field<'a>]> {
    if !fields.iter().any(|field| keys::is_reserved(field.key())) {
        return Cow::Borrowed(fields);
    }
    fields
        .iter()
        .map(|field| match keys::escape_reserved(field.key()) {
            Some(key) => Field::new(key, field.value().clone()),
            None => field.clone(),
        })
        .collect()
}

/// Directories used to shorten the source locations attached to error records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePaths {
    pub cwd: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl SourcePaths {
    /// Make `file` relative to the working directory, or to `~` if it is under the home
    /// directory
    pub fn shorten(&self, file: &str) -> String {
        let path = Path::new(file);
        if let Some(relative) = self.cwd.as_deref().and_then(|cwd| path.strip_prefix(cwd).ok()) {
            return relative.display().to_string();
        }
        if let Some(relative) = self.home.as_deref().and_then(|home| path.strip_prefix(home).ok())
        {
            return Path::new("~").join(relative).display().to_string();
        }
        file.to_string()
    }
}
