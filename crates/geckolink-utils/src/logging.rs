//! # Logging Utilities
//!
//! Logging infrastructure for geckolink using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Pretty output for terminals and JSON output for log collectors
//! - Level filtering through `RUST_LOG` or an explicit level
//! - An optional log file next to the console output
//!
//! Console output goes to stderr so that command results on stdout stay
//! machine-readable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geckolink_utils::{init_logging, LoggingConfig};
//!
//! // Keep the guard alive for as long as the program logs.
//! let _guard = init_logging(&LoggingConfig::from_env()?)?;
//! tracing::info!("Connected");
//! # Ok::<(), geckolink_utils::LoggingError>(())
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g. `RUST_LOG=debug`, `RUST_LOG=geckolink_core=trace`)
//! - `GECKOLINK_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `GECKOLINK_LOG_FILE`: Optional log file. A file path rolls over daily; an
//!   existing directory receives one `YYYY-MM-DD-geckolink.log` per run day.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const ENV_LOG_FORMAT: &str = "GECKOLINK_LOG_FORMAT";
/// Environment variable naming the log file.
pub const ENV_LOG_FILE: &str = "GECKOLINK_LOG_FILE";
/// Standard filter variable read by `EnvFilter`.
pub const ENV_RUST_LOG: &str = "RUST_LOG";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
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
    /// Debug level, one line per protocol operation
    Debug,
    /// Trace level, every request frame
    Trace,
}

impl LogLevel
{
    /// Lowercase name, as accepted in filter directives.
    #[must_use]
    pub fn as_str(self) -> &'static str
    {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
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
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Everything needed to install the subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoggingConfig
{
    /// Explicit level; takes precedence over `directives`
    pub level: Option<LogLevel>,
    /// `RUST_LOG`-style filter directives
    pub directives: Option<String>,
    /// Output format for console and file
    pub format: LogFormat,
    /// Optional log file or directory
    pub file: Option<PathBuf>,
}

impl LoggingConfig
{
    /// Read `RUST_LOG`, `GECKOLINK_LOG_FORMAT` and `GECKOLINK_LOG_FILE`.
    ///
    /// ## Errors
    ///
    /// `InvalidFormat` if `GECKOLINK_LOG_FORMAT` is set to an unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`LoggingConfig::from_env`], reading variables through `lookup`.
    ///
    /// ## Errors
    ///
    /// See [`LoggingConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup(ENV_LOG_FORMAT) {
            Some(value) => LogFormat::from_str(&value).map_err(LoggingError::InvalidFormat)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            level: None,
            directives: lookup(ENV_RUST_LOG).filter(|value| !value.trim().is_empty()),
            format,
            file: lookup(ENV_LOG_FILE).filter(|value| !value.trim().is_empty()).map(PathBuf::from),
        })
    }

    /// Force a level, ignoring `RUST_LOG`.
    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self
    {
        if level.is_some() {
            self.level = level;
        }
        self
    }

    /// Override the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }

    /// The filter directives that will be installed.
    ///
    /// Priority:
    /// 1. An explicit level (from `--log-level`)
    /// 2. `RUST_LOG` directives (module-specific filters allowed)
    /// 3. `info`
    #[must_use]
    pub fn effective_directives(&self) -> String
    {
        match (self.level, &self.directives) {
            (Some(level), _) => level.as_str().to_string(),
            (None, Some(directives)) => directives.clone(),
            (None, None) => LogLevel::Info.as_str().to_string(),
        }
    }

    /// Build the level filter from [`LoggingConfig::effective_directives`].
    ///
    /// ## Errors
    ///
    /// `InvalidLevel` if the directives do not parse.
    pub fn filter(&self) -> Result<EnvFilter, LoggingError>
    {
        let directives = self.effective_directives();
        EnvFilter::try_new(&directives).map_err(|err| LoggingError::InvalidLevel(format!("{directives}: {err}")))
    }
}

/// Keeps the background log file writer running.
///
/// Dropping it flushes and stops the file writer, so hold it until the program
/// exits. Without a log file it holds nothing.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// ## Example
///
/// ```rust,no_run
/// use geckolink_utils::{init_logging, LogFormat, LogLevel, LoggingConfig};
///
/// let config = LoggingConfig::default()
///     .with_level(Some(LogLevel::Debug))
///     .with_format(LogFormat::Json);
/// let _guard = init_logging(&config).expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - The filter directives do not parse
/// - The log directory cannot be created
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = vec![format_layer(config.format, io::stderr, true, config.filter()?)];

    let mut file_guard = None;
    if let Some(path) = &config.file {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
        layers.push(format_layer(config.format, writer, false, config.filter()?));
        file_guard = Some(guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard { _file: file_guard })
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => Box::new(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(ansi)
                .with_writer(writer)
                .with_filter(filter),
        ),
        LogFormat::Json => Box::new(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(writer)
                .with_filter(filter),
        ),
    }
}

/// Where file output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget
{
    /// A dated file inside a directory, never rotated
    Dated
    {
        directory: PathBuf,
        file_name: String,
    },
    /// A file prefix rotated daily by the appender
    Daily
    {
        directory: PathBuf,
        prefix: PathBuf,
    },
}

fn log_target(path: &Path) -> LogTarget
{
    if path.is_dir() {
        let today = Utc::now().format("%Y-%m-%d");
        return LogTarget::Dated {
            directory: path.to_path_buf(),
            file_name: format!("{today}-geckolink.log"),
        };
    }

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let prefix = path.file_name().map_or_else(|| PathBuf::from("geckolink.log"), PathBuf::from);
    LogTarget::Daily { directory, prefix }
}

fn file_appender(path: &Path) -> Result<tracing_appender::rolling::RollingFileAppender, LoggingError>
{
    match log_target(path) {
        LogTarget::Dated { directory, file_name } => Ok(tracing_appender::rolling::never(directory, file_name)),
        LogTarget::Daily { directory, prefix } => {
            std::fs::create_dir_all(&directory)?;
            Ok(tracing_appender::rolling::daily(directory, prefix))
        }
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level or filter directive
    #[error("Invalid log level: {0}")]
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
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
    {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |name| vars.get(name).cloned()
    }

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
    fn test_config_from_environment()
    {
        let config = LoggingConfig::from_lookup(lookup(&[
            (ENV_LOG_FORMAT, "json"),
            (ENV_LOG_FILE, "/var/log/geckolink.log"),
            (ENV_RUST_LOG, "geckolink_core=trace"),
        ]))
        .unwrap();

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/var/log/geckolink.log")));
        assert_eq!(config.directives.as_deref(), Some("geckolink_core=trace"));
        assert_eq!(config.level, None);
    }

    #[test]
    fn test_invalid_format_is_reported()
    {
        let err = LoggingConfig::from_lookup(lookup(&[(ENV_LOG_FORMAT, "xml")])).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFormat(_)));
    }

    #[test]
    fn test_filter_priority()
    {
        let config = LoggingConfig {
            directives: Some("warn".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(config.effective_directives(), "warn");

        let config = config.with_level(Some(LogLevel::Trace));
        assert_eq!(config.effective_directives(), "trace");
        assert!(config.filter().is_ok());

        // `None` keeps whatever level was already chosen.
        let config = config.with_level(None);
        assert_eq!(config.level, Some(LogLevel::Trace));

        assert_eq!(LoggingConfig::default().effective_directives(), "info");
    }

    #[test]
    fn test_invalid_directives_are_reported()
    {
        let config = LoggingConfig {
            directives: Some("geckolink_core=loud".to_string()),
            ..LoggingConfig::default()
        };
        assert!(matches!(config.filter(), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_target()
    {
        let dir = env::temp_dir();
        assert!(matches!(log_target(&dir), LogTarget::Dated { ref file_name, .. } if file_name.ends_with("-geckolink.log")));

        assert_eq!(
            log_target(Path::new("gecko.log")),
            LogTarget::Daily {
                directory: PathBuf::from("."),
                prefix: PathBuf::from("gecko.log"),
            }
        );
    }
}
