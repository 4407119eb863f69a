//! Logging setup.
//!
//! Installs a `tracing-subscriber` registry with:
//! - an `EnvFilter` (`RUST_LOG` overrides the configured level)
//! - a human-readable layer on stderr
//! - an optional daily-rolling log file written off-thread
//!
//! ```ignore
//! let _guard = init_logging(LoggingConfig::default().with_level(Level::DEBUG))?;
//! tracing::info!("ready");
//! ```
//!
//! Keep the returned guard alive for the life of the program. Dropping it
//! flushes and closes the log file.

use std::path::{Path, PathBuf};

use thiserror::Error;
use time::macros::format_description;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Errors from logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("invalid log file path: {}", .0.display())]
    InvalidLogFile(PathBuf),

    #[error("failed to initialize logging: {0}")]
    Init(String),
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for this crate and the CLI. Dependencies log at `warn`.
    pub level: Level,
    /// Full filter directive; replaces `level` when set.
    pub filter: Option<String>,
    /// Log file path. The date is appended to the file name daily.
    pub log_file: Option<PathBuf>,
    /// Include the event target (module path) in output.
    pub display_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            filter: None,
            log_file: None,
            display_target: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    /// The filter directive this configuration implies.
    pub fn directive(&self) -> String {
        match &self.filter {
            Some(filter) => filter.clone(),
            None => {
                let level = self.level.as_str().to_lowercase();
                format!("warn,tilevault={},tilevault_cli={}", level, level)
            }
        }
    }
}

/// Installs the global subscriber.
///
/// Returns the file writer's guard when a log file is configured. Fails if a
/// global subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_filter(&config)?;
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let stderr_layer = fmt::layer()
        .with_target(config.display_target)
        .with_timer(timer.clone())
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let (directory, prefix) = split_log_path(path)?;
            std::fs::create_dir_all(&directory)
                .map_err(|_| LoggingError::InvalidLogFile(path.clone()))?;
            let appender = tracing_appender::rolling::daily(directory, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_timer(timer)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(guard)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if config.filter.is_none() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(config.directive()).map_err(|e| LoggingError::InvalidFilter(e.to_string()))
}

fn split_log_path(path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::InvalidLogFile(path.to_path_buf()))?
        .to_string();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, prefix))
}
