use std::{fmt, io, str::FromStr};

use parking_lot::Mutex;

use crate::filter::ParseError;

/// Log target, either `stdout`, `stderr` or a custom pipe.
#[non_exhaustive]
#[derive(Default)]
pub enum Target {
    /// Logs will be sent to standard output.
    #[default]
    Stdout,
    /// Logs will be sent to standard error.
    Stderr,
    /// Logs will be sent to a custom pipe.
    Pipe(Box<dyn io::Write + Send + 'static>),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Stdout => "stdout",
                Self::Stderr => "stderr",
                Self::Pipe(_) => "pipe",
            }
        )
    }
}

/// Whether or not to print styles to the target.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Default)]
pub enum WriteStyle {
    /// Try to print styles, but don't force the issue.
    #[default]
    Auto,
    /// Try very hard to print styles.
    Always,
    /// Never print styles.
    Never,
}

impl WriteStyle {
    /// Decide whether styled output should be produced for a target of the given capability
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            Self::Auto => is_terminal,
            Self::Always => true,
            Self::Never => false,
        }
    }

    #[cfg(feature = "auto-color")]
    fn into_color_choice(self) -> anstream::ColorChoice {
        match self {
            Self::Auto => anstream::ColorChoice::Auto,
            Self::Always => anstream::ColorChoice::Always,
            Self::Never => anstream::ColorChoice::Never,
        }
    }
}

impl FromStr for WriteStyle {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(ParseError::new(format!(
                "invalid write style '{other}': expected one of 'auto', 'always' or 'never'"
            ))),
        }
    }
}

/// The sink shared by all loggers of a [crate::Logging] instance.
///
/// Every record is written with a single locked `write_all`, so records from different loggers
/// never interleave.
pub(crate) struct Writer {
    inner: Mutex<Box<dyn io::Write + Send>>,
}

impl Writer {
    pub fn new(target: Target, write_style: WriteStyle) -> Self {
        let inner: Box<dyn io::Write + Send> = match target {
            #[cfg(feature = "auto-color")]
            Target::Stdout => {
                Box::new(anstream::AutoStream::new(io::stdout(), write_style.into_color_choice()))
            }
            #[cfg(feature = "auto-color")]
            Target::Stderr => {
                Box::new(anstream::AutoStream::new(io::stderr(), write_style.into_color_choice()))
            }
            #[cfg(not(feature = "auto-color"))]
            Target::Stdout => {
                let _ = write_style;
                Box::new(io::stdout())
            }
            #[cfg(not(feature = "auto-color"))]
            Target::Stderr => {
                let _ = write_style;
                Box::new(io::stderr())
            }
            Target::Pipe(pipe) => pipe,
        };
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut inner = self.inner.lock();
        inner.write_all(bytes)?;
        inner.flush()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer").finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::{Target, WriteStyle, Writer, testing::Capture};

    #[test]
    fn write_style_parse() {
        assert_eq!("auto".parse::<WriteStyle>(), Ok(WriteStyle::Auto));
        assert_eq!(" always ".parse::<WriteStyle>(), Ok(WriteStyle::Always));
        assert_eq!("never".parse::<WriteStyle>(), Ok(WriteStyle::Never));
        assert!("sometimes".parse::<WriteStyle>().is_err());
    }

    #[test]
    fn write_style_enabled() {
        assert!(WriteStyle::Auto.enabled(true));
        assert!(!WriteStyle::Auto.enabled(false));
        assert!(WriteStyle::Always.enabled(false));
        assert!(!WriteStyle::Never.enabled(true));
    }

    #[test]
    fn pipe_receives_whole_writes() {
        let capture = Capture::default();
        let writer = Writer::new(Target::Pipe(Box::new(capture.clone())), WriteStyle::Never);
        writer.write(b"one\n").unwrap();
        writer.write(b"two\n").unwrap();
        assert_eq!(capture.contents(), "one\ntwo\n");
        assert_eq!(format!("{:?}", Target::Pipe(Box::new(capture))), "pipe");
    }
}
