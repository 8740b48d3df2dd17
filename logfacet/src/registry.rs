use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;

use crate::{
    Config, Level, Logger, LoggerHandle,
    fmt::{Field, FormatId, FormatOptions, FormatRegistry, TextFormatter},
    writer::Writer,
};

/// The name of the logger used to report problems with the logging configuration itself
pub const INTERNAL_LOGGER: &str = "__logfacet";

/// The name of the logger returned by [crate::Logging::default_logger]
pub const DEFAULT_LOGGER: &str = "~";

type Slot = Arc<OnceLock<LoggerHandle>>;

/// Creates loggers on demand, at most once per name.
///
/// The map lock is only held to find or insert the slot for a name. The logger itself is built
/// outside of it, so a format factory may freely request other loggers. A factory must not
/// request the logger it is building.
pub struct LoggerRegistry {
    config: Arc<Config>,
    formats: Arc<FormatRegistry>,
    writer: Arc<Writer>,
    loggers: Mutex<BTreeMap<String, Slot>>,
    constructed: AtomicUsize,
    internal: LoggerHandle,
}

impl LoggerRegistry {
    pub(crate) fn new(
        config: Arc<Config>,
        formats: Arc<FormatRegistry>,
        writer: Arc<Writer>,
    ) -> Self {
        // Never derived from the configuration, which may be what is being reported
        let internal = Arc::new(Logger::new(
            INTERNAL_LOGGER,
            Level::Error,
            FormatId::TEXT,
            Box::new(TextFormatter::new(FormatOptions::default())),
            Arc::clone(&writer),
            Arc::clone(config.paths()),
        ));

        let slot = Slot::default();
        let _ = slot.set(Arc::clone(&internal));
        let mut loggers = BTreeMap::new();
        loggers.insert(INTERNAL_LOGGER.to_string(), slot);

        Self {
            config,
            formats,
            writer,
            loggers: Mutex::new(loggers),
            constructed: AtomicUsize::new(0),
            internal,
        }
    }

    /// Get the logger called `name`, constructing it first if this is the first request for it.
    ///
    /// Concurrent first requests for the same name all wait for a single construction and receive
    /// the same handle.
    pub fn get_or_create(&self, name: &str) -> LoggerHandle {
        let slot = {
            let mut loggers = self.loggers.lock();
            match loggers.get(name) {
                Some(slot) => Arc::clone(slot),
                None => {
                    let slot = Slot::default();
                    loggers.insert(name.to_string(), Arc::clone(&slot));
                    slot
                }
            }
        };
        Arc::clone(slot.get_or_init(|| self.construct(name)))
    }

    /// Get the logger called `name`, if it was already constructed
    pub fn get(&self, name: &str) -> Option<LoggerHandle> {
        self.loggers.lock().get(name).and_then(|slot| slot.get().cloned())
    }

    /// The number of loggers constructed on demand, not counting the internal logger
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::Acquire)
    }

    /// The names of all constructed loggers, including the internal one
    pub fn names(&self) -> Vec<String> {
        self.loggers
            .lock()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The logger used to report configuration problems
    #[inline]
    pub fn internal(&self) -> &LoggerHandle {
        &self.internal
    }

    #[inline]
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    #[inline]
    pub fn formats(&self) -> &Arc<FormatRegistry> {
        &self.formats
    }

    pub(crate) fn flush(&self) {
        self.internal.flush();
    }

    fn construct(&self, name: &str) -> LoggerHandle {
        let level = self.config.level_for(name);
        let options = self.config.options();
        let mut format = self.config.format_for(name).clone();
        let formatter = match self.formats.create(&format, name, options) {
            Ok(formatter) => formatter,
            Err(err) => {
                self.internal.write(
                    Level::Error,
                    &err.to_string(),
                    &[Field::new("logger", name)],
                    None,
                );
                format = FormatId::TEXT;
                Box::new(TextFormatter::new(options.clone()))
            }
        };
        self.constructed.fetch_add(1, Ordering::AcqRel);
        Arc::new(Logger::new(
            name,
            level,
            format,
            formatter,
            Arc::clone(&self.writer),
            Arc::clone(self.config.paths()),
        ))
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("loggers", &self.names())
            .field("constructed", &self.constructed())
            .finish_non_exhaustive()
    }
}
