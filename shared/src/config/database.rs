//! Database configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name under which a database is registered when none is given
pub const DEFAULT_DB_NAME: &str = "default";

/// Database configuration for one named connection pool
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Connections kept in the pool
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Extra connections allowed above `pool_size` under load
    #[serde(default = "default_max_overflow")]
    pub max_overflow: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,

    /// Maximum lifetime of a connection in seconds
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime: u64,

    /// Log every SQL statement
    #[serde(default)]
    pub echo: bool,

    /// Slow query threshold in milliseconds
    #[serde(default = "default_slow_query_threshold")]
    pub slow_query_threshold: u64,

    /// Check connections are alive before handing them out
    #[serde(default = "default_pre_ping")]
    pub pre_ping: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("sqlite://zodiac.db?mode=rwc")
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: default_pool_size(),
            max_overflow: default_max_overflow(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
            max_lifetime: default_max_lifetime(),
            echo: false,
            slow_query_threshold: default_slow_query_threshold(),
            pre_ping: default_pre_ping(),
        }
    }

    /// Set the steady pool size and the allowed overflow
    pub fn with_pool(mut self, pool_size: u32, max_overflow: u32) -> Self {
        self.pool_size = pool_size;
        self.max_overflow = max_overflow;
        self
    }

    /// Enable SQL statement logging
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Upper bound of open connections
    pub fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow).max(1)
    }

    /// Connections kept open while idle
    pub fn min_connections(&self) -> u32 {
        self.pool_size.min(self.max_connections())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime)
    }

    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_threshold)
    }

    /// Check if the URL points at SQLite
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    /// URL with any password replaced, safe for logs
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        match rest.split_once('@') {
            Some((credentials, host)) => {
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{scheme}://{user}:***@{host}")
            }
            None => self.url.clone(),
        }
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_max_overflow() -> u32 {
    20
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    1800
}

fn default_slow_query_threshold() -> u64 {
    1000 // 1 second
}

fn default_pre_ping() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_connections_includes_overflow() {
        let config = DatabaseConfig::new("postgres://localhost/app").with_pool(5, 3);
        assert_eq!(config.max_connections(), 8);
        assert_eq!(config.min_connections(), 5);

        let empty = DatabaseConfig::new("postgres://localhost/app").with_pool(0, 0);
        assert_eq!(empty.max_connections(), 1);
    }

    #[test]
    fn test_redacted_url() {
        let config = DatabaseConfig::new("postgres://app:secret@db:5432/app");
        assert_eq!(config.redacted_url(), "postgres://app:***@db:5432/app");
        assert_eq!(DatabaseConfig::default().redacted_url(), "sqlite://zodiac.db?mode=rwc");
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"url": "mysql://localhost/app", "echo": true}"#).unwrap();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.max_overflow, 20);
        assert!(config.echo);
        assert!(config.pre_ping);
        assert!(!config.is_sqlite());
    }
}
