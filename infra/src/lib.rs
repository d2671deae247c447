//! # Infrastructure Layer
//!
//! Database access for zodiac services, built on SQLx and generic over the
//! backend (`sqlx::Database`):
//! - **Manager**: named, independently configured connection pools
//! - **Session**: transaction-scoped units of work that never auto-commit
//! - **Pagination**: count + slice queries derived from a base query
//! - **Repository**: a base that resolves its pool by name
//!
//! ## Features
//!
//! - `mysql`, `postgres`, `sqlite`: enable the matching SQLx driver

/// Database module - pools, sessions, pagination and models
pub mod database;

pub use database::{
    paginate, DatabaseManager, DbSession, Dialect, NamedDatabase, PageQuery, PoolStatistics,
    SqlRepository,
};
pub use zd_shared::config::{DatabaseConfig, DEFAULT_DB_NAME};

use zd_shared::{ApiError, ErrorKind};

/// Database layer errors
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Lookup of a name that was never set up (or was shut down)
    #[error("Database '{name}' is not initialized. Call setup(\"{name}\") first.")]
    NotInitialized { name: String },

    /// Connection URL could not be parsed
    #[error("Invalid database URL for '{name}': {source}")]
    InvalidUrl {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    /// Page parameters failed validation; nothing was executed
    #[error("Invalid page parameters: {0}")]
    InvalidPage(#[from] validator::ValidationErrors),

    /// Error reported by the driver
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if the error was caused by caller input rather than the database
    pub fn is_client_error(&self) -> bool {
        matches!(self, DatabaseError::InvalidPage(_))
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::InvalidPage(errors) => ApiError::from(errors),
            other => {
                tracing::error!("Database failure: {}", other);
                ApiError::new(ErrorKind::Internal)
            }
        }
    }
}
