//! Unit tests for the named pool registry

use std::sync::Arc;

use sqlx::Sqlite;
use tempfile::TempDir;

use super::sqlite_config;
use crate::database::manager::{DatabaseManager, PoolStatistics};
use crate::DatabaseError;

#[tokio::test]
async fn test_setup_twice_returns_same_pool() {
    let dir = TempDir::new().unwrap();
    let manager = DatabaseManager::<Sqlite>::new();

    let first = manager.setup("default", &sqlite_config(&dir, "a.db")).unwrap();
    let second = manager.setup("default", &sqlite_config(&dir, "other.db")).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.config().url, first.config().url);
    assert_eq!(manager.names(), vec!["default".to_string()]);
    manager.shutdown().await;
}

#[tokio::test]
async fn test_unknown_name_is_descriptive_error() {
    let manager = DatabaseManager::<Sqlite>::new();

    match manager.get_engine("missing") {
        Err(DatabaseError::NotInitialized { name }) => assert_eq!(name, "missing"),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
    assert!(matches!(
        manager.get_session_factory("missing"),
        Err(DatabaseError::NotInitialized { .. })
    ));
    assert!(matches!(
        manager.session("missing").await,
        Err(DatabaseError::NotInitialized { .. })
    ));
}

#[tokio::test]
async fn test_shutdown_is_safe_when_empty_and_repeated() {
    let manager = DatabaseManager::<Sqlite>::new();
    manager.shutdown().await;
    manager.shutdown().await;
    assert!(manager.names().is_empty());
}

#[tokio::test]
async fn test_shutdown_clears_registry() {
    let dir = TempDir::new().unwrap();
    let manager = DatabaseManager::<Sqlite>::new();
    manager.setup("default", &sqlite_config(&dir, "a.db")).unwrap();
    manager.setup("analytics", &sqlite_config(&dir, "b.db")).unwrap();
    assert_eq!(manager.names(), vec!["analytics".to_string(), "default".to_string()]);

    manager.shutdown().await;

    assert!(!manager.contains("default"));
    assert!(matches!(
        manager.get_engine("analytics"),
        Err(DatabaseError::NotInitialized { .. })
    ));
}

#[tokio::test]
async fn test_verify_and_statistics() {
    let dir = TempDir::new().unwrap();
    let manager = DatabaseManager::<Sqlite>::new();
    let config = sqlite_config(&dir, "health.db").with_pool(2, 3);
    manager.setup_default(&config).unwrap();

    assert!(manager.verify("default").await.unwrap());

    let stats = manager.statistics("default").unwrap();
    assert_eq!(stats.max_connections, 5);
    assert!(stats.connections <= 5);
    manager.shutdown().await;
}

#[test]
fn test_pool_statistics_display() {
    let stats = PoolStatistics {
        connections: 5,
        idle_connections: 3,
        max_connections: 10,
    };

    let display = format!("{}", stats);
    assert!(display.contains("5/10"));
    assert!(display.contains("3 idle"));
}
