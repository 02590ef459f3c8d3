//! Logging and tracing configuration
//!
//! Narrative clinic events are emitted through `tracing` with a
//! `component = "clinic"` field so they can be filtered apart from engine
//! diagnostics. The subscriber is installed once per process by the binary.

use crate::types::config::{parse_log_format, CliArgs, ConfigError};
use crate::types::LogFormat;
use std::io;
use tracing::{debug, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Boxed error returned by subscriber initialization
pub type LoggingInitError = Box<dyn std::error::Error + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the application
    pub level: Level,
    /// Whether to enable JSON formatting
    pub json_format: bool,
    /// Whether to log to file
    pub log_to_file: bool,
    /// Log file directory (if logging to file)
    pub log_directory: Option<String>,
    /// Log file prefix (if logging to file)
    pub log_file_prefix: String,
    /// Whether to enable span events
    pub enable_span_events: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
    /// Custom environment filter
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            log_to_file: false,
            log_directory: None,
            log_file_prefix: "clinic-flow-simulator".to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

/// Keeps non-blocking writers flushing until dropped
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable file logging
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_to_file = true;
        self.log_directory = Some(directory.into());
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggingInitError> {
        if let Some(filter) = &self.env_filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                self.level
            ))
        }))
    }

    /// Install the global tracing subscriber
    ///
    /// Console output always goes to stderr so that stdout carries only the
    /// report. The returned guard must outlive the run when file logging is on.
    pub fn init(self) -> Result<LoggingGuard, LoggingInitError> {
        let registry = Registry::default().with(self.build_filter()?);
        let mut guards = Vec::new();

        if self.log_to_file {
            let log_dir = self.log_directory.as_deref().unwrap_or("logs");
            let file_appender = rolling::daily(log_dir, &self.log_file_prefix);
            let (file_writer, file_guard) = non_blocking(file_appender);
            guards.push(file_guard);

            let file_layer = fmt::layer()
                .json()
                .with_writer(file_writer)
                .with_span_events(self.span_events());

            if self.json_format {
                let console_layer = fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_span_events(self.span_events());
                registry.with(file_layer).with(console_layer).try_init()?;
            } else {
                let console_layer = fmt::layer()
                    .with_writer(io::stderr)
                    .with_ansi(self.enable_ansi)
                    .with_span_events(self.span_events());
                registry.with(file_layer).with(console_layer).try_init()?;
            }
        } else if self.json_format {
            let layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(self.span_events());
            registry.with(layer).try_init()?;
        } else {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_span_events(self.span_events());
            registry.with(layer).try_init()?;
        }

        debug!(level = %self.level, json = self.json_format, "Logging initialized");
        Ok(LoggingGuard { _guards: guards })
    }

    /// Console preset for the verbosity flags: warnings, narrative, or debug with span timings
    pub fn for_verbosity(verbose: bool, debug: bool) -> Self {
        if debug {
            Self::new().with_level(Level::DEBUG).with_span_events()
        } else if verbose {
            Self::new().with_level(Level::INFO)
        } else {
            Self::new().with_level(Level::WARN)
        }
    }

    /// Build the logging setup requested on the command line
    ///
    /// JSON output drops ANSI colors. A log directory adds a daily-rolling
    /// JSON file next to the console output.
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::for_verbosity(args.verbose, args.debug);

        if parse_log_format(args.log_format.as_deref())? == LogFormat::Json {
            config = config.with_json_format().without_ansi();
        }
        if let Some(directory) = &args.log_dir {
            config = config.with_file_logging(directory.clone());
        }
        if let Some(filter) = &args.log_filter {
            config = config.with_env_filter(filter.clone());
        }

        Ok(config)
    }

    /// Initialize logging for testing (minimal output)
    pub fn init_test() -> Result<LoggingGuard, LoggingInitError> {
        Self::new().with_level(Level::WARN).without_ansi().init()
    }
}

/// Emit a structured clinic event tagged with the simulation clock
#[macro_export]
macro_rules! sim_event {
    ($level:ident, $message:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::$level!(
            message = $message,
            component = "clinic",
            $($key = $value,)*
        );
    };
    ($level:ident, $message:expr) => {
        tracing::$level!(
            message = $message,
            component = "clinic",
        );
    };
}

/// Open a span measuring wall-clock cost of a run phase
#[macro_export]
macro_rules! perf_span {
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info_span!(
            $name,
            component = "performance",
            $($key = $value,)*
        )
    };
    ($name:expr) => {
        tracing::info_span!(
            $name,
            component = "performance",
        )
    };
}
