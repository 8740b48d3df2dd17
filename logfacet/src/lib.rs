//! Named, structured loggers configured centrally from environment variables.
//!
//! Every logger has a name. Its level comes from a set of rules matched against that name, and
//! every record it emits carries structured fields besides the message. Loggers are created on
//! first use and shared afterwards: asking for the same name twice returns the same logger.
//!
//! ## Example
//!
//! ```
//! use logfacet::fmt::Field;
//!
//! let logging = logfacet::builder().build();
//! let log = logging.get("server");
//!
//! log.warn("slow start", &[Field::new("port", 8080)]);
//! if log.is_debug() {
//!     log.debug("routes", &[Field::new("count", 42)]);
//! }
//! ```
//!
//! The `log` crate's macros work too, once [Logging::install] made the instance the global
//! logger. Records are then written by the logger named after their target:
//!
//! ```no_run
//! logfacet::init();
//!
//! log::error!(target: "server", port = 8080; "bind failed");
//! ```
//!
//! ## Enabling logging
//!
//! The **`LOGFACET`** environment variable holds a comma-separated list of rules:
//!
//! ```console
//! LOGFACET=pattern=LEVEL[,pattern=LEVEL]*
//! ```
//!
//! A pattern is either `*`, which matches every logger, or a prefix of logger names, optionally
//! followed by a `*`. Levels are `DBG`, `INF`, `WRN`, `ERR` and `OFF`, in any case; the long names
//! `debug`, `info`, `warn`, `error` and `off` are accepted as well.
//!
//! When several rules match a name, the one written last wins. A name that no rule matches gets
//! `ERR`. For example, `LOGFACET=*=WRN,svcA=ERR` gives:
//!
//! - `svcA` and `svcA-sub`: `ERR`
//! - `svcB`: `WRN`
//!
//! A bare pattern, like `LOGFACET=db`, turns on everything for it; a negated one, like
//! `LOGFACET=*=DBG,-db`, turns it off.
//!
//! If `LOGFACET` is not set, all loggers log at `WRN` when standard output is a terminal, and at
//! `ERR` otherwise. If it is set but malformed, no part of it is used: the problem is reported
//! through the internal `__logfacet` logger and the defaults apply.
//!
//! ## Formats
//!
//! **`LOGFACET_FORMAT`** selects how records are rendered, with optional settings:
//!
//! ```console
//! LOGFACET_FORMAT=<format>[,t=<strftime>][,maxcol=<n>]
//! ```
//!
//! The built-in formats are `happy` (the default on terminals), `text` and `json` (the default
//! otherwise). Custom formats can be registered with [Builder::register_format]; see the [fmt]
//! module.
//!
//! ## Colors
//!
//! **`LOGFACET_COLORS`** replaces the color scheme of the `happy` format, for example
//! `key=cyan+h,value,misc=blue,source=88,DBG,WRN=yellow,INF=green+h,ERR=red+h`. See
//! [fmt::ColorScheme] for the syntax.
//!
//! **`LOGFACET_STYLE`** controls whether styles are written at all, and accepts the following
//! [values][WriteStyle]:
//!
//! * `auto` (default) writes styles only if the output is a terminal.
//! * `always` will always write style characters.
//! * `never` will never write style characters.
//!
//! ## Reserved keys
//!
//! The fields `_l` (level), `_m` (message), `_n` (logger name), `_t` (time) and `_c` (caller
//! location, on errors only) are written by the logger itself. A caller-supplied field with one of
//! these keys is renamed to `@<key>`. See the [keys] module.
//!
//! ## Specifying defaults for environment variables
//!
//! The names of the variables, and values to use when they are unset, can be changed with the
//! [`Env`] type:
//!
//! ```
//! use logfacet::Env;
//!
//! let logging = logfacet::Builder::from_env(Env::default().default_filter_or("*=INF")).build();
//! ```

#![warn(clippy::print_stderr)]
#![warn(clippy::print_stdout)]

mod config;
mod env;
mod error;
pub mod filter;
pub mod fmt;
pub mod keys;
mod level;
mod logger;
mod logging;
mod registry;
mod writer;

pub use self::{
    config::{Config, Sources},
    env::{
        DEFAULT_COLORS_ENV, DEFAULT_FILTER_ENV, DEFAULT_FORMAT_ENV, DEFAULT_WRITE_STYLE_ENV,
        Defaults, Env, Terminal,
    },
    error::Error,
    level::{Level, ParseLevelError},
    logger::{Logger, LoggerHandle, SourcePaths},
    logging::{Builder, Logging},
    registry::{DEFAULT_LOGGER, INTERNAL_LOGGER, LoggerRegistry},
    writer::{Target, WriteStyle},
};

/// Create a new builder with the default environment variables.
///
/// The builder can be configured before being initialized.
/// This is a convenient way of calling [`Builder::from_default_env`].
pub fn builder() -> Builder {
    Builder::from_default_env()
}

/// Attempts to initialize the global logger with a configuration read from the `LOGFACET*`
/// environment variables.
///
/// Configuration errors do not make this fail: they are reported through the internal logger
/// and the defaults are used instead.
///
/// # Errors
///
/// This function will fail if it is called more than once, or if another library has already
/// initialized a global logger.
pub fn try_init() -> Result<&'static Logging, Error> {
    builder().build().install()
}

/// Initializes the global logger with a configuration read from the `LOGFACET*` environment
/// variables.
///
/// # Panics
///
/// This function will panic if it is called more than once, or if another library has already
/// initialized a global logger.
pub fn init() -> &'static Logging {
    try_init().expect("logfacet::init should not be called after logger initialized")
}

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
