#![forbid(unsafe_code)]

//! Process-wide tracing subscriber bootstrap.
//!
//! Library code only emits `tracing` events; the embedding application calls
//! [`init`] once at startup. The filter is read from `SKYFI_LOG` (standard
//! `EnvFilter` syntax) and falls back to the supplied default directive.

use std::fmt;

use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the log filter.
pub const LOG_ENV: &str = "SKYFI_LOG";

/// Output format for the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging could not be initialized.
#[derive(Debug)]
pub enum LoggingError {
    /// The default directive did not parse.
    InvalidFilter(String),
    /// A global subscriber was already installed.
    AlreadyInitialized,
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFilter(msg) => write!(f, "invalid log filter: {msg}"),
            Self::AlreadyInitialized => f.write_str("global tracing subscriber already set"),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Build the filter from `SKYFI_LOG`, or `default_directive` if unset.
pub fn filter(default_directive: &str) -> Result<EnvFilter, LoggingError> {
    match std::env::var(LOG_ENV) {
        Ok(spec) if !spec.trim().is_empty() => {
            EnvFilter::try_new(spec).map_err(|e| LoggingError::InvalidFilter(e.to_string()))
        }
        _ => EnvFilter::try_new(default_directive)
            .map_err(|e| LoggingError::InvalidFilter(e.to_string())),
    }
}

/// Install the global subscriber.
pub fn init(format: LogFormat, default_directive: &str) -> Result<(), LoggingError> {
    let filter = filter(default_directive)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|_| LoggingError::AlreadyInitialized)
}
