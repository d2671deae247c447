//! Database tests on SQLite temp files

mod manager_tests;

use tempfile::TempDir;
use zd_shared::config::DatabaseConfig;

/// Config for a SQLite file inside `dir`, created on first connect
pub(crate) fn sqlite_config(dir: &TempDir, file: &str) -> DatabaseConfig {
    let path = dir.path().join(file);
    DatabaseConfig::new(format!("sqlite://{}?mode=rwc", path.display())).with_pool(1, 0)
}
