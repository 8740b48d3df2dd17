use crate::filter::ParseError;

/// Errors raised while resolving logging configuration or validating structured fields.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A rule, format or color scheme string was malformed
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A format identifier was requested which has no registered factory
    #[error("unknown log format '{format}'")]
    UnknownFormat { format: String },
    /// A structured field key was checked which is not a string
    #[error("key is not a string")]
    TypeMismatch,
    /// The current working directory could not be determined
    #[error("could not get working directory")]
    DirectoryUnavailable(#[source] std::io::Error),
    /// Another logger was already installed as the `log` crate's global logger
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}
