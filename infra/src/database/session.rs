//! Transaction-scoped database sessions

use std::future::Future;
use std::ops::{Deref, DerefMut};

use sqlx::{Database, Transaction};
use zd_shared::Timestamped;

use crate::DatabaseError;

/// A unit of work on one named database
///
/// A session wraps a transaction and never commits on its own:
/// - [`commit`](Self::commit) persists the changes
/// - dropping the session without committing rolls back and returns the
///   connection to the pool
/// - [`close`](Self::close) rolls back explicitly and logs a rollback failure
///
/// The session dereferences to the backend connection, so queries run on it
/// directly: `query.execute(&mut *session)`.
pub struct DbSession<DB: Database> {
    name: String,
    tx: Transaction<'static, DB>,
}

impl<DB: Database> DbSession<DB> {
    pub(crate) fn new(name: String, tx: Transaction<'static, DB>) -> Self {
        Self { name, tx }
    }

    /// Name of the database this session belongs to
    pub fn database_name(&self) -> &str {
        &self.name
    }

    /// Persist the changes made in this session
    pub async fn commit(self) -> Result<(), DatabaseError> {
        let name = self.name;
        self.tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit session on '{}': {}", name, e);
            DatabaseError::Sqlx(e)
        })
    }

    /// Discard the changes made in this session
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        Ok(self.tx.rollback().await?)
    }

    /// End the session without committing.
    ///
    /// A failing rollback is logged, not returned; the connection is
    /// released either way.
    pub async fn close(self) {
        let name = self.name;
        if let Err(e) = self.tx.rollback().await {
            tracing::warn!("Rollback failed while closing session on '{}': {}", name, e);
        }
    }

    /// Run a mutating statement for `entity`.
    ///
    /// `updated_at` is refreshed before `statement` is built, so the
    /// statement binds the new value.
    pub async fn write<'s, T, F, Fut, R>(
        &'s mut self,
        entity: &'s mut T,
        statement: F,
    ) -> Result<R, DatabaseError>
    where
        T: Timestamped,
        F: FnOnce(&'s T, &'s mut DB::Connection) -> Fut,
        Fut: Future<Output = Result<R, sqlx::Error>>,
    {
        entity.timestamps_mut().touch();
        let entity: &'s T = entity;
        Ok(statement(entity, &mut *self.tx).await?)
    }
}

impl<DB: Database> Deref for DbSession<DB> {
    type Target = DB::Connection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

impl<DB: Database> DerefMut for DbSession<DB> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tx
    }
}

impl<DB: Database> std::fmt::Debug for DbSession<DB> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSession").field("database", &self.name).finish()
    }
}
