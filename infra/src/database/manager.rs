//! Named connection pool management
//!
//! A [`DatabaseManager`] owns one SQLx pool per logical name. Pools are
//! created lazily: `setup` only validates the URL and configures the pool,
//! connections are opened on first use.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::LevelFilter;
use sqlx::pool::PoolOptions;
use sqlx::{ConnectOptions, Connection, Database, Executor, Pool};

use super::session::DbSession;
use crate::DatabaseError;
use zd_shared::config::{DatabaseConfig, DEFAULT_DB_NAME};

/// A configured pool registered under a name
#[derive(Debug)]
pub struct NamedDatabase<DB: Database> {
    name: String,
    pool: Pool<DB>,
    config: DatabaseConfig,
}

impl<DB: Database> NamedDatabase<DB> {
    /// Name the pool was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a reference to the underlying SQLx pool
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }

    /// Configuration used to create this pool
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Open a new session (a transaction) on this pool
    pub async fn session(&self) -> Result<DbSession<DB>, DatabaseError> {
        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to open session on '{}': {}", self.name, e);
            DatabaseError::Sqlx(e)
        })?;
        Ok(DbSession::new(self.name.clone(), tx))
    }

    /// Get connection pool statistics
    pub fn statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }
}

/// Registry of named connection pools
///
/// Constructed explicitly and shared (`Arc`, `web::Data`) with whatever
/// needs database access. Each name maps to an isolated pool.
pub struct DatabaseManager<DB: Database> {
    databases: RwLock<HashMap<String, Arc<NamedDatabase<DB>>>>,
}

impl<DB: Database> Default for DatabaseManager<DB> {
    fn default() -> Self {
        Self::new()
    }
}

impl<DB: Database> std::fmt::Debug for DatabaseManager<DB> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("databases", &self.names())
            .finish()
    }
}

impl<DB: Database> DatabaseManager<DB> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            databases: RwLock::new(HashMap::new()),
        }
    }

    /// Register a pool under `name`.
    ///
    /// Setting up a name that already exists is a no-op: a warning is logged
    /// and the existing pool is returned. Must be called from within a Tokio
    /// runtime, the pool spawns its maintenance task there.
    pub fn setup(
        &self,
        name: &str,
        config: &DatabaseConfig,
    ) -> Result<Arc<NamedDatabase<DB>>, DatabaseError> {
        let mut databases = self.databases.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = databases.get(name) {
            tracing::warn!(
                "Database '{}' is already configured, skipping duplicate setup.",
                name
            );
            return Ok(Arc::clone(existing));
        }

        tracing::info!(
            "Creating database pool '{}' for {} with max_connections: {}",
            name,
            config.redacted_url(),
            config.max_connections()
        );

        let connect_options = config
            .url
            .parse::<<DB::Connection as Connection>::Options>()
            .map_err(|source| DatabaseError::InvalidUrl {
                name: name.to_string(),
                source,
            })?;

        // Configure statement logging
        let statement_level = if config.echo {
            LevelFilter::Info
        } else {
            LevelFilter::Debug
        };
        let connect_options = connect_options
            .log_statements(statement_level)
            .log_slow_statements(LevelFilter::Warn, config.slow_query_threshold());

        let pool = PoolOptions::<DB>::new()
            // Connection pool size
            .max_connections(config.max_connections())
            .min_connections(if config.is_sqlite() { 0 } else { config.min_connections() })
            // Connection lifecycle
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            // Test connections before returning from pool
            .test_before_acquire(config.pre_ping)
            .connect_lazy_with(connect_options);

        let database = Arc::new(NamedDatabase {
            name: name.to_string(),
            pool,
            config: config.clone(),
        });
        databases.insert(name.to_string(), Arc::clone(&database));

        tracing::info!("Database '{}' initialized successfully.", name);
        Ok(database)
    }

    /// Register the default pool
    pub fn setup_default(
        &self,
        config: &DatabaseConfig,
    ) -> Result<Arc<NamedDatabase<DB>>, DatabaseError> {
        self.setup(DEFAULT_DB_NAME, config)
    }

    /// Access the pool registered under `name`
    pub fn get_engine(&self, name: &str) -> Result<Pool<DB>, DatabaseError> {
        Ok(self.get_session_factory(name)?.pool().clone())
    }

    /// Access the named database handle, which opens sessions
    pub fn get_session_factory(&self, name: &str) -> Result<Arc<NamedDatabase<DB>>, DatabaseError> {
        self.databases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| DatabaseError::NotInitialized {
                name: name.to_string(),
            })
    }

    /// Check if a pool is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.databases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .databases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Open a new session on the pool registered under `name`.
    ///
    /// The session never commits on its own; see [`DbSession`].
    pub async fn session(&self, name: &str) -> Result<DbSession<DB>, DatabaseError> {
        self.get_session_factory(name)?.session().await
    }

    /// Statistics of the pool registered under `name`
    pub fn statistics(&self, name: &str) -> Result<PoolStatistics, DatabaseError> {
        Ok(self.get_session_factory(name)?.statistics())
    }

    /// Close every pool and clear the registry.
    ///
    /// Safe to call on an empty registry and to call repeatedly.
    pub async fn shutdown(&self) {
        let databases: Vec<Arc<NamedDatabase<DB>>> = self
            .databases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, database)| database)
            .collect();

        for database in databases {
            tracing::info!("Closing database connection pool '{}'", database.name());
            database.pool().close().await;
        }
    }
}

impl<DB: Database> DatabaseManager<DB>
where
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
{
    /// Check the pool registered under `name` can run `SELECT 1`
    pub async fn verify(&self, name: &str) -> Result<bool, DatabaseError> {
        let database = self.get_session_factory(name)?;
        tracing::debug!("Performing database health check on '{}'", name);

        let mut conn = database.pool().acquire().await.map_err(|e| {
            tracing::error!("Database health check failed on '{}': {}", name, e);
            DatabaseError::Sqlx(e)
        })?;
        (&mut *conn).execute("SELECT 1").await.map_err(|e| {
            tracing::error!("Database health check failed on '{}': {}", name, e);
            DatabaseError::Sqlx(e)
        })?;

        tracing::info!("Database '{}' connection verified.", name);
        Ok(true)
    }

    /// Run DDL statements (e.g. `CREATE TABLE`) on the pool registered under `name`.
    ///
    /// Statements run in one transaction. Meant for development and tests;
    /// use migrations in production.
    pub async fn create_all<S>(&self, name: &str, statements: &[S]) -> Result<(), DatabaseError>
    where
        S: AsRef<str>,
    {
        let mut session = self.session(name).await?;
        for statement in statements {
            (&mut *session).execute(statement.as_ref()).await?;
        }
        session.commit().await
    }
}

/// Connection pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PoolStatistics {
    /// Total number of connections in the pool
    pub connections: u32,
    /// Number of idle connections
    pub idle_connections: usize,
    /// Maximum allowed connections
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}
