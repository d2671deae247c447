//! Environment configuration module

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable selecting the active environment
pub const DEFAULT_ENV_VAR: &str = "APPLICATION_ENVIRONMENT";

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    Develop,
    /// Testing environment
    Testing,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Every known environment
    pub const ALL: [Environment; 4] = [
        Environment::Develop,
        Environment::Testing,
        Environment::Staging,
        Environment::Production,
    ];

    /// Canonical lowercase name, as used in config file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Develop => "develop",
            Environment::Testing => "testing",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Check if running in development
    pub fn is_develop(&self) -> bool {
        matches!(self, Environment::Develop)
    }

    /// Check if debug mode should be enabled
    pub fn is_debug(&self) -> bool {
        matches!(self, Environment::Develop | Environment::Testing)
    }

    /// Read the environment from [`DEFAULT_ENV_VAR`], defaulting to production
    pub fn from_env() -> Self {
        env::var(DEFAULT_ENV_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Check if `name` is one of the known environment names
    pub fn is_known(name: &str) -> bool {
        Self::ALL.iter().any(|env| env.as_str() == name)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Production
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "develop" | "development" | "dev" => Ok(Environment::Develop),
            "testing" | "test" => Ok(Environment::Testing),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
