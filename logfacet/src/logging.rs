use std::{borrow::Cow, env, fmt, mem, path::PathBuf, sync::Arc};

use log::kv::{self, VisitSource};

use crate::{
    Config, Error, Level, LoggerHandle, LoggerRegistry, SourcePaths,
    config::Sources,
    env::{Defaults, Env, Terminal},
    filter::{Pattern, Rule},
    fmt::{Field, Format, FormatId, FormatOptions, FormatRegistry, Value},
    registry::DEFAULT_LOGGER,
    writer::{Target, WriteStyle, Writer},
};

/// `Builder` acts as builder for initializing a [Logging] instance.
///
/// ## Example
///
/// ```
/// use logfacet::{Builder, Level, Terminal, Target};
///
/// let mut builder = Builder::new();
/// builder
///     .terminal(Terminal::piped())
///     .target(Target::Stderr)
///     .parse_filters("*=WRN,db=DBG");
///
/// let logging = builder.build();
/// assert_eq!(logging.get("db.pool").level(), Level::Debug);
/// assert_eq!(logging.default_logger().level(), Level::Warn);
/// ```
pub struct Builder {
    sources: Sources,
    terminal: Option<Terminal>,
    target: Target,
    paths: Option<SourcePaths>,
    formats: FormatRegistry,
    errors: Vec<Error>,
    built: bool,
}

impl Builder {
    /// Initializes the builder with defaults, ignoring the environment.
    pub fn new() -> Builder {
        Builder {
            sources: Sources::default(),
            terminal: None,
            target: Target::default(),
            paths: None,
            formats: FormatRegistry::new(),
            errors: Vec::new(),
            built: false,
        }
    }

    /// Initializes the builder from the given set of environment variables.
    ///
    /// ## Example
    ///
    /// ```
    /// use logfacet::{Builder, Env};
    ///
    /// let env = Env::new().filter_or("MY_LOG", "*=INF").format("MY_LOG_FORMAT");
    /// let logging = Builder::from_env(env).build();
    /// ```
    pub fn from_env<'a, E>(env: E) -> Self
    where
        E: Into<Env<'a>>,
    {
        let mut builder = Builder::new();
        builder.parse_env(env);
        builder
    }

    /// Initializes the builder from the `LOGFACET`, `LOGFACET_FORMAT`, `LOGFACET_COLORS` and
    /// `LOGFACET_STYLE` environment variables.
    pub fn from_default_env() -> Self {
        Self::from_env(Env::default())
    }

    /// Applies the configuration found in the given set of environment variables.
    pub fn parse_env<'a, E>(&mut self, env: E) -> &mut Self
    where
        E: Into<Env<'a>>,
    {
        let env = env.into();

        if let Some(filters) = env.get_filter() {
            self.parse_filters(&filters);
        }
        if let Some(format) = env.get_format() {
            self.parse_format(&format);
        }
        if let Some(colors) = env.get_colors() {
            self.parse_colors(&colors);
        }
        if let Some(write_style) = env.get_write_style() {
            self.parse_write_style(&write_style);
        }

        self
    }

    /// Adds the rules of a `pattern=LEVEL[,pattern=LEVEL]*` string.
    ///
    /// Rules added by successive calls are applied in order, so later rules win.
    pub fn parse_filters(&mut self, filters: &str) -> &mut Self {
        match &mut self.sources.filters {
            Some(existing) => {
                existing.push(',');
                existing.push_str(filters);
            }
            None => self.sources.filters = Some(filters.to_string()),
        }
        self
    }

    /// Adds a rule applying `level` to every logger whose name starts with `prefix`.
    pub fn filter_prefix(&mut self, prefix: &str, level: Level) -> &mut Self {
        self.sources.rules.push(Rule::new(Pattern::prefix(prefix), level));
        self
    }

    /// Adds a rule applying `level` to all loggers.
    pub fn filter_level(&mut self, level: Level) -> &mut Self {
        self.sources.rules.push(Rule::any(level));
        self
    }

    /// Selects the default format, e.g. `json` or `happy,t=%H:%M:%S,maxcol=120`.
    pub fn parse_format(&mut self, format: &str) -> &mut Self {
        self.sources.format = Some(format.to_string());
        self
    }

    /// Uses `format` for the logger called exactly `name`, instead of the default format.
    pub fn format_for(&mut self, name: impl Into<String>, format: impl Into<FormatId>) -> &mut Self {
        self.sources.overrides.insert(name.into(), format.into());
        self
    }

    /// Replaces the color scheme, e.g. `key=cyan+h,value,misc=blue,ERR=red+h`.
    pub fn parse_colors(&mut self, colors: &str) -> &mut Self {
        self.sources.colors = Some(colors.to_string());
        self
    }

    /// Whether or not to write styles with records.
    pub fn write_style(&mut self, write_style: WriteStyle) -> &mut Self {
        self.sources.write_style = write_style;
        self
    }

    /// Parses whether or not to write styles, one of `auto`, `always` or `never`.
    pub fn parse_write_style(&mut self, write_style: &str) -> &mut Self {
        match write_style.parse::<WriteStyle>() {
            Ok(write_style) => self.sources.write_style = write_style,
            Err(err) => self.errors.push(err.into()),
        }
        self
    }

    /// Overrides the terminal capabilities used to choose defaults, instead of detecting them.
    pub fn terminal(&mut self, terminal: Terminal) -> &mut Self {
        self.terminal = Some(terminal);
        self
    }

    /// Sets the target for the log output. Defaults to `stdout`.
    pub fn target(&mut self, target: Target) -> &mut Self {
        self.target = target;
        self
    }

    /// Overrides the directories used to shorten source locations, instead of detecting them.
    pub fn source_paths(&mut self, paths: SourcePaths) -> &mut Self {
        self.paths = Some(paths);
        self
    }

    /// Registers `factory` as the constructor of the format `id`, replacing any previous one.
    pub fn register_format<F>(&mut self, id: FormatId, factory: F) -> &mut Self
    where
        F: Fn(&str, &FormatOptions) -> Box<dyn Format> + Send + Sync + 'static,
    {
        self.formats.register(id, factory);
        self
    }

    /// Builds a [Logging] instance.
    ///
    /// This never fails: every configuration error is reported once through the internal logger
    /// and the affected setting falls back to its default. The errors remain available from
    /// [Logging::errors].
    pub fn build(&mut self) -> Logging {
        let (mut logging, mut errors) = self.assemble();
        for error in errors.iter().chain(&logging.errors) {
            logging.report(error);
        }
        errors.append(&mut logging.errors);
        logging.errors = errors;
        logging
    }

    /// Builds a [Logging] instance, failing with the first configuration error.
    ///
    /// A working directory that cannot be determined is not a configuration error: it is still
    /// only reported.
    pub fn try_build(&mut self) -> Result<Logging, Error> {
        let (logging, errors) = self.assemble();
        if let Some(error) = errors.into_iter().next() {
            return Err(error);
        }
        for error in &logging.errors {
            logging.report(error);
        }
        Ok(logging)
    }

    /// Resolves the configuration, returning the instance with its environment errors and,
    /// separately, the configuration errors
    fn assemble(&mut self) -> (Logging, Vec<Error>) {
        assert!(!self.built, "attempt to re-use consumed builder");
        self.built = true;

        let terminal = self.terminal.take().unwrap_or_else(Terminal::detect);
        let defaults = Defaults::for_terminal(&terminal);
        let mut environment_errors = Vec::new();
        let paths = self.paths.take().unwrap_or_else(|| {
            let (paths, error) = detect_source_paths();
            environment_errors.extend(error);
            paths
        });

        let formats = mem::take(&mut self.formats);
        let (config, config_errors) = Config::resolve(&defaults, &self.sources, &formats);
        let mut errors = mem::take(&mut self.errors);
        errors.extend(config_errors);

        let writer = Writer::new(mem::take(&mut self.target), self.sources.write_style);
        let registry = LoggerRegistry::new(
            Arc::new(config.with_paths(paths)),
            Arc::new(formats),
            Arc::new(writer),
        );
        let default = registry.get_or_create(DEFAULT_LOGGER);

        let logging = Logging {
            registry,
            default,
            errors: environment_errors,
        };
        (logging, errors)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.built {
            f.debug_struct("Builder").field("built", &true).finish()
        } else {
            f.debug_struct("Builder")
                .field("sources", &self.sources)
                .field("terminal", &self.terminal)
                .field("target", &self.target)
                .field("formats", &self.formats)
                .finish()
        }
    }
}

fn detect_source_paths() -> (SourcePaths, Option<Error>) {
    let (cwd, error) = match env::current_dir() {
        Ok(cwd) => (Some(cwd), None),
        Err(err) => (None, Some(Error::DirectoryUnavailable(err))),
    };
    let home = env::var_os(if cfg!(windows) { "HOMEPATH" } else { "HOME" }).map(PathBuf::from);
    (SourcePaths { cwd, home }, error)
}

/// A configured set of named loggers sharing one output.
///
/// Loggers are created on first request with the level the rules assign to their name, and the
/// default format unless they were given their own.
pub struct Logging {
    registry: LoggerRegistry,
    default: LoggerHandle,
    errors: Vec<Error>,
}

impl Logging {
    /// Get the logger called `name`, creating it on first use.
    pub fn get(&self, name: &str) -> LoggerHandle {
        self.registry.get_or_create(name)
    }

    /// The logger called `~`, used when no name is more appropriate
    #[inline]
    pub fn default_logger(&self) -> &LoggerHandle {
        &self.default
    }

    /// The logger reporting problems with the logging configuration
    #[inline]
    pub fn internal(&self) -> &LoggerHandle {
        self.registry.internal()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        self.registry.config()
    }

    #[inline]
    pub fn registry(&self) -> &LoggerRegistry {
        &self.registry
    }

    /// The errors encountered while building this instance
    #[inline]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// The most verbose level any logger can have
    pub fn max_level(&self) -> Level {
        self.config().rules().max_level()
    }

    /// Installs this instance as the global logger of the `log` crate.
    ///
    /// Records logged through `log` are written by the logger named after their target.
    ///
    /// # Errors
    ///
    /// This function will fail if it is called more than once, or if another library has already
    /// initialized a global logger.
    pub fn install(self) -> Result<&'static Logging, Error> {
        let max_level = self.max_level();
        let logging: &'static Logging = Box::leak(Box::new(self));
        log::set_logger(logging)?;
        log::set_max_level(max_level.to_level_filter());
        Ok(logging)
    }

    fn report(&self, error: &Error) {
        self.internal().write(Level::Error, &error.to_string(), &[], None);
    }
}

impl fmt::Debug for Logging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logging")
            .field("registry", &self.registry)
            .field("errors", &self.errors)
            .finish()
    }
}

impl log::Log for Logging {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        // Answered from the rules, so that asking never creates a logger
        let level = Level::from(metadata.level());
        level.is_enabled_for(self.config().level_for(metadata.target()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let logger = self.get(record.target());
        let level = Level::from(record.level());
        if !logger.enabled(level) {
            return;
        }

        let mut fields = Fields::default();
        // Collecting never fails
        let _ = record.key_values().visit(&mut fields);
        let message = match record.args().as_str() {
            Some(message) => Cow::Borrowed(message),
            None => Cow::Owned(record.args().to_string()),
        };
        logger.write(level, &message, &fields.0, record.file().zip(record.line()));
    }

    fn flush(&self) {
        self.registry.flush();
    }
}

/// Collects the key-values of a `log` record as fields
#[derive(Default)]
struct Fields(Vec<Field<'static>>);

impl<'kvs> VisitSource<'kvs> for Fields {
    fn visit_pair(&mut self, key: kv::Key<'kvs>, value: kv::Value<'kvs>) -> Result<(), kv::Error> {
        self.0.push(Field::new(key.as_str().to_string(), to_json(&value)));
        Ok(())
    }
}

fn to_json(value: &kv::Value<'_>) -> Value {
    if let Some(value) = value.to_bool() {
        Value::Bool(value)
    } else if let Some(value) = value.to_i64() {
        Value::from(value)
    } else if let Some(value) = value.to_u64() {
        Value::from(value)
    } else if let Some(value) = value.to_f64() {
        Value::from(value)
    } else {
        Value::String(value.to_string())
    }
}
