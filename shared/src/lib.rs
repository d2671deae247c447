//! Shared building blocks for zodiac services
//!
//! This crate has no web framework or database dependency:
//! - Configuration types and config file discovery
//! - The business error taxonomy
//! - The response envelope, pagination and base schemas

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, ConfigManagement, DatabaseConfig, Environment, LoggingConfig,
    TraceConfig, DEFAULT_DB_NAME,
};
pub use errors::{ApiError, ErrorKind};
pub use types::{
    ApiResponse, IntIdSchema, PageParams, PagedResponse, Timestamped, Timestamps, UuidSchema,
};
