//! Logging configuration module

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::environment::Environment;

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Service name included in every record
    #[serde(default = "default_service")]
    pub service: String,

    /// Log level filter (trace, debug, info, warn, error), `RUST_LOG` syntax accepted
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format of the console sink
    #[serde(default)]
    pub format: LogFormat,

    /// Optional rolling file sink
    #[serde(default)]
    pub file: Option<LogFileConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            level: default_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Create logging config for environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Develop | Environment::Testing => Self {
                level: String::from("debug"),
                format: LogFormat::Text,
                ..Default::default()
            },
            Environment::Staging | Environment::Production => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                ..Default::default()
            },
        }
    }

    /// Set the service name
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Write logs to a rolling file as well as the console
    pub fn with_file(mut self, file: LogFileConfig) -> Self {
        self.file = Some(file);
        self
    }
}

/// Log format enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Pipe-separated human readable lines
    #[default]
    Text,
}

/// How often the log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// File logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogFileConfig {
    /// Directory the log files are written to
    #[serde(default = "default_log_dir")]
    pub directory: PathBuf,

    /// File name prefix; rotated files get a date suffix
    #[serde(default = "default_file_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Format of the file sink
    #[serde(default = "default_file_format")]
    pub format: LogFormat,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            prefix: default_file_prefix(),
            rotation: LogRotation::default(),
            format: default_file_format(),
        }
    }
}

fn default_service() -> String {
    String::from("zodiac")
}

fn default_level() -> String {
    String::from("info")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_file_prefix() -> String {
    String::from("app.log")
}

fn default_file_format() -> LogFormat {
    LogFormat::Json
}
