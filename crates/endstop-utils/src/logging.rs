//! # Logging Utilities
//!
//! Logging infrastructure for Endstop using `tracing`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use endstop_utils::init_logging;
//!
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("fallback handler armed");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: log level filter (e.g. `debug`, `endstop_core=trace`)
//! - `ENDSTOP_LOG_FORMAT`: output format (`json` or `pretty`, default: `pretty`)
//! - `ENDSTOP_LOG_FILE`: optional path; when set, log lines go to that file
//!   instead of standard error

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: log level filter
/// - `ENDSTOP_LOG_FORMAT`: output format (`json` or `pretty`)
/// - `ENDSTOP_LOG_FILE`: optional path to a log file
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file's
/// directory cannot be created.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var("ENDSTOP_LOG_FORMAT")
        .ok()
        .and_then(|s| LogFormat::from_str(&s).ok())
        .unwrap_or(LogFormat::Pretty);

    let default_level = env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse::<LogLevel>()
        .map(Into::into)
        .unwrap_or(Level::INFO);

    init(format, default_level)
}

/// Initialize logging with explicit level and format
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file's
/// directory cannot be created.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init(format, level.into())
}

fn init(format: LogFormat, default_level: Level) -> Result<(), LoggingError>
{
    // RUST_LOG can override the default level with more specific filters
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let (writer, ansi) = diagnostic_writer()?;
    let base = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(ansi)
        .with_writer(writer);

    match format {
        LogFormat::Pretty => Registry::default().with(base.with_filter(filter)).try_init(),
        LogFormat::Json => Registry::default().with(base.json().with_filter(filter)).try_init(),
    }
    .map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

/// Pick the log sink: `ENDSTOP_LOG_FILE` when set, standard error otherwise.
/// Returns the writer and whether ANSI colors are appropriate for it.
fn diagnostic_writer() -> Result<(BoxMakeWriter, bool), LoggingError>
{
    let Some(path) = env::var("ENDSTOP_LOG_FILE").ok().map(PathBuf::from) else {
        return Ok((BoxMakeWriter::new(io::stderr), true));
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let file_name = path.file_name().map_or_else(|| "endstop.log".into(), ToOwned::to_owned);

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    // Keep the background flush thread alive for the process lifetime.
    std::mem::forget(guard);

    Ok((BoxMakeWriter::new(non_blocking), false))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Unknown log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Unknown log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_invalid_level_message_names_the_input()
    {
        let err = LogLevel::from_str("loud").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }
}
