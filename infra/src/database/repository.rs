//! Repository base

use std::sync::Arc;

use sqlx::{Database, Pool};
use zd_shared::config::DEFAULT_DB_NAME;

use super::manager::DatabaseManager;
use super::session::DbSession;
use crate::DatabaseError;

/// Base for SQL repositories
///
/// Resolves its pool from a [`DatabaseManager`] by name on every call, so a
/// repository can be built before the database is set up. A pool passed with
/// [`with_pool`](Self::with_pool) takes precedence over the name.
///
/// ```ignore
/// pub struct UserRepository {
///     base: SqlRepository<Postgres>,
/// }
///
/// impl UserRepository {
///     pub async fn rename(&self, id: i64, name: &str) -> Result<(), DatabaseError> {
///         let mut session = self.base.session().await?;
///         sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
///             .bind(name)
///             .bind(id)
///             .execute(&mut *session)
///             .await?;
///         session.commit().await
///     }
/// }
/// ```
pub struct SqlRepository<DB: Database> {
    manager: Arc<DatabaseManager<DB>>,
    db_name: String,
    pool: Option<Pool<DB>>,
}

impl<DB: Database> Clone for SqlRepository<DB> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            db_name: self.db_name.clone(),
            pool: self.pool.clone(),
        }
    }
}

impl<DB: Database> SqlRepository<DB> {
    /// Repository on the default database
    pub fn new(manager: Arc<DatabaseManager<DB>>) -> Self {
        Self::named(manager, DEFAULT_DB_NAME)
    }

    /// Repository on the database registered under `db_name`
    pub fn named(manager: Arc<DatabaseManager<DB>>, db_name: impl Into<String>) -> Self {
        Self {
            manager,
            db_name: db_name.into(),
            pool: None,
        }
    }

    /// Use `pool` instead of looking the database up by name
    pub fn with_pool(mut self, pool: Pool<DB>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// The pool this repository runs on
    pub fn pool(&self) -> Result<Pool<DB>, DatabaseError> {
        match &self.pool {
            Some(pool) => Ok(pool.clone()),
            None => self.manager.get_engine(&self.db_name),
        }
    }

    /// Open a new session; it must be committed to persist changes
    pub async fn session(&self) -> Result<DbSession<DB>, DatabaseError> {
        match &self.pool {
            Some(pool) => {
                let tx = pool.begin().await?;
                Ok(DbSession::new(self.db_name.clone(), tx))
            }
            None => self.manager.session(&self.db_name).await,
        }
    }
}
