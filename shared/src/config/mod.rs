//! Configuration module
//!
//! - `database` - Named connection pool configuration
//! - `environment` - Environment detection
//! - `logging` - Log level, format and file sink
//! - `management` - Config file discovery and loading
//! - `trace` - Request trace id propagation

pub mod database;
pub mod environment;
pub mod logging;
pub mod management;
pub mod trace;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use database::{DatabaseConfig, DEFAULT_DB_NAME};
pub use environment::{Environment, DEFAULT_ENV_VAR};
pub use logging::{LogFileConfig, LogFormat, LogRotation, LoggingConfig};
pub use management::{ConfigError, ConfigManagement, DiscoveryOptions};
pub use trace::TraceConfig;

/// HTTP bind settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl ServerConfig {
    /// Get the bind address
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn default_host() -> String {
    String::from("127.0.0.1")
}

fn default_port() -> u16 {
    8000
}

/// Complete application configuration combining all sub-configurations
///
/// `databases` maps a pool name to its settings, so `[databases.default]`
/// in a TOML file (or `databases.default.url` in dotted form) configures
/// the default pool.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub databases: HashMap<String, DatabaseConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub trace: TraceConfig,
}

impl AppConfig {
    /// Settings of the default pool, if configured
    pub fn default_database(&self) -> Option<&DatabaseConfig> {
        self.databases.get(DEFAULT_DB_NAME)
    }
}
