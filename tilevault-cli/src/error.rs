//! CLI error type.

use std::fmt;

use tilevault::config::ConfigError;
use tilevault::controller::ControllerError;
use tilevault::coord::CoordError;
use tilevault::fetch::FetchError;
use tilevault::logging::LoggingError;
use tilevault::resolver::ResolveError;
use tilevault::store::StoreError;

/// Errors surfaced to the user. Every variant exits with status 1.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, parsed or saved.
    Config(String),
    /// Invalid command-line arguments.
    InvalidArgument(String),
    /// Logging could not be set up.
    Logging(String),
    /// The tile store could not be opened or queried.
    Store(String),
    /// The HTTP client could not be created.
    Http(String),
    /// A save or removal could not run.
    Controller(String),
    /// A save finished but some tiles failed.
    PartialSave { failed: usize, total: usize },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Logging(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Store(msg) => write!(f, "Tile store error: {}", msg),
            CliError::Http(msg) => write!(f, "HTTP client error: {}", msg),
            CliError::Controller(msg) => write!(f, "{}", msg),
            CliError::PartialSave { failed, total } => {
                write!(f, "{} of {} tiles could not be saved", failed, total)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidArgument(e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e.to_string())
    }
}

impl From<ResolveError> for CliError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Coord(inner) => inner.into(),
            ResolveError::Store(inner) => inner.into(),
        }
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Http(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e.to_string())
    }
}

impl From<ControllerError> for CliError {
    fn from(e: ControllerError) -> Self {
        match e {
            ControllerError::Config(inner) => CliError::Config(inner.to_string()),
            ControllerError::Size(inner) | ControllerError::Clear(inner) => {
                CliError::Store(inner.to_string())
            }
            other => CliError::Controller(other.to_string()),
        }
    }
}
