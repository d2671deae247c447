//! Database module - SQLx implementations generic over the backend
//!
//! This module provides the database access layer including:
//! - Named connection pool management
//! - Transaction-scoped sessions
//! - Pagination over arbitrary base queries
//! - Repository base and model helpers

pub mod manager;
pub mod model;
pub mod pagination;
pub mod repository;
pub mod session;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use manager::{DatabaseManager, NamedDatabase, PoolStatistics};
pub use model::{timestamp_columns, timestamped_table, updated_at_triggers, utc_now_sql, Dialect};
pub use pagination::{paginate, PageQuery};
pub use repository::SqlRepository;
pub use session::DbSession;
