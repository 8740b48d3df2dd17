use std::{
    borrow::Cow,
    env,
    io::{self, IsTerminal},
};

use crate::{
    Level,
    filter::Rules,
    fmt::{ColorScheme, FormatId},
};

/// The default name for the environment variable to read rules from.
pub const DEFAULT_FILTER_ENV: &str = "LOGFACET";

/// The default name for the environment variable to read the format selection from.
pub const DEFAULT_FORMAT_ENV: &str = "LOGFACET_FORMAT";

/// The default name for the environment variable to read the color scheme from.
pub const DEFAULT_COLORS_ENV: &str = "LOGFACET_COLORS";

/// The default name for the environment variable to read the style preferences from.
pub const DEFAULT_WRITE_STYLE_ENV: &str = "LOGFACET_STYLE";

/// Set of environment variables to configure from.
///
/// # Default environment variables
///
/// By default, the `Env` will read the following environment variables:
///
/// - `LOGFACET`: the rules string
/// - `LOGFACET_FORMAT`: the format selection
/// - `LOGFACET_COLORS`: the color scheme
/// - `LOGFACET_STYLE`: whether or not to print styles with records
///
/// These sources can be configured using the builder methods on `Env`.
#[derive(Debug, Clone)]
pub struct Env<'a> {
    filter: Var<'a>,
    format: Var<'a>,
    colors: Var<'a>,
    write_style: Var<'a>,
}

impl<'a> Env<'a> {
    /// Get a default set of environment variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify an environment variable to read the rules from.
    pub fn filter<E>(mut self, filter_env: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        self.filter = Var::new(filter_env);
        self
    }

    /// Specify an environment variable to read the rules from.
    ///
    /// If the variable is not set, the default value will be used.
    pub fn filter_or<E, V>(mut self, filter_env: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        self.filter = Var::new_with_default(filter_env, default);
        self
    }

    /// Use the default environment variable to read the rules from.
    ///
    /// If the variable is not set, the default value will be used.
    pub fn default_filter_or<V>(mut self, default: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        self.filter = Var::new_with_default(DEFAULT_FILTER_ENV, default);
        self
    }

    /// Specify an environment variable to read the format selection from.
    pub fn format<E>(mut self, format_env: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        self.format = Var::new(format_env);
        self
    }

    /// Specify an environment variable to read the format selection from.
    ///
    /// If the variable is not set, the default value will be used.
    pub fn format_or<E, V>(mut self, format_env: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        self.format = Var::new_with_default(format_env, default);
        self
    }

    /// Specify an environment variable to read the color scheme from.
    pub fn colors<E>(mut self, colors_env: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        self.colors = Var::new(colors_env);
        self
    }

    /// Specify an environment variable to read the style from.
    pub fn write_style<E>(mut self, write_style_env: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        self.write_style = Var::new(write_style_env);
        self
    }

    pub(crate) fn get_filter(&self) -> Option<String> {
        self.filter.get()
    }

    pub(crate) fn get_format(&self) -> Option<String> {
        self.format.get()
    }

    pub(crate) fn get_colors(&self) -> Option<String> {
        self.colors.get()
    }

    pub(crate) fn get_write_style(&self) -> Option<String> {
        self.write_style.get()
    }
}

impl<'a, T> From<T> for Env<'a>
where
    T: Into<Cow<'a, str>>,
{
    fn from(filter_env: T) -> Self {
        Env::default().filter(filter_env.into())
    }
}

impl Default for Env<'_> {
    fn default() -> Self {
        Env {
            filter: Var::new(DEFAULT_FILTER_ENV),
            format: Var::new(DEFAULT_FORMAT_ENV),
            colors: Var::new(DEFAULT_COLORS_ENV),
            write_style: Var::new(DEFAULT_WRITE_STYLE_ENV),
        }
    }
}

#[derive(Debug, Clone)]
struct Var<'a> {
    name: Cow<'a, str>,
    default: Option<Cow<'a, str>>,
}

impl<'a> Var<'a> {
    fn new<E>(name: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        Var {
            name: name.into(),
            default: None,
        }
    }

    fn new_with_default<E, V>(name: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        Var {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    fn get(&self) -> Option<String> {
        env::var(&*self.name)
            .ok()
            .or_else(|| self.default.clone().map(|v| v.into_owned()))
    }
}

/// The capabilities of the terminal the process writes to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Terminal {
    /// Whether standard output is an interactive terminal
    pub is_tty: bool,
    /// The value of `TERM`, if set
    pub term: Option<String>,
    /// Whether the process runs on Windows
    pub windows: bool,
}

impl Terminal {
    /// Detect the capabilities of the terminal attached to standard output
    pub fn detect() -> Self {
        Self {
            is_tty: io::stdout().is_terminal(),
            term: env::var("TERM").ok(),
            windows: cfg!(windows),
        }
    }

    /// An interactive, non-Windows terminal with the given `TERM`
    pub fn interactive(term: Option<&str>) -> Self {
        Self {
            is_tty: true,
            term: term.map(str::to_owned),
            windows: false,
        }
    }

    /// Output which is redirected to a file or a pipe
    pub fn piped() -> Self {
        Self::default()
    }
}

/// The defaults chosen from the capabilities of the terminal.
///
/// Interactive terminals get a readable format and `Warn` level, while redirected output gets
/// machine-readable `json` records and only `Error`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub level: Level,
    pub format: FormatId,
    pub time_format: &'static str,
    pub colors: bool,
    pub scheme: &'static str,
    pub max_col: usize,
}

impl Defaults {
    /// A scheme for dark backgrounds which also reads well on light ones
    pub const WINDOWS_SCHEME: &'static str =
        "key=cyan,value,misc=blue,source=magenta,DBG,WRN=yellow,INF=green,ERR=red";
    pub const XTERM_256_SCHEME: &'static str =
        "key=cyan+h,value,misc=blue,source=88,DBG,WRN=yellow,INF=green+h,ERR=red+h";
    pub const ANSI_SCHEME: &'static str =
        "key=cyan+h,value,misc=blue,source=magenta,DBG,WRN=yellow,INF=green,ERR=red+h";

    pub fn for_terminal(terminal: &Terminal) -> Self {
        let scheme = if terminal.windows {
            Self::WINDOWS_SCHEME
        } else if terminal.term.as_deref() == Some("xterm-256color") {
            Self::XTERM_256_SCHEME
        } else {
            Self::ANSI_SCHEME
        };

        if terminal.is_tty {
            Self {
                level: Level::Warn,
                format: FormatId::HAPPY,
                time_format: "%H:%M:%S%.6f",
                colors: true,
                scheme,
                max_col: 80,
            }
        } else {
            Self {
                level: Level::Error,
                format: FormatId::JSON,
                time_format: "%Y-%m-%dT%H:%M:%S%z",
                colors: false,
                scheme,
                max_col: 80,
            }
        }
    }

    /// The rules used when none are configured: `*=<level>`
    pub fn rules(&self) -> Rules {
        Rules::with_default(self.level)
    }

    pub fn color_scheme(&self) -> ColorScheme {
        // The built-in schemes are known to parse
        ColorScheme::parse(self.scheme).unwrap_or_default()
    }
}
