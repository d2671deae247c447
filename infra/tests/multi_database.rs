//! Integration tests for independently named databases

use std::sync::Arc;

use sqlx::Sqlite;
use tempfile::TempDir;
use zd_infra::{DatabaseConfig, DatabaseManager, SqlRepository};

fn config(dir: &TempDir, file: &str) -> DatabaseConfig {
    let path = dir.path().join(file);
    DatabaseConfig::new(format!("sqlite://{}?mode=rwc", path.display())).with_pool(1, 1)
}

async fn create_events(manager: &DatabaseManager<Sqlite>, name: &str) {
    manager
        .create_all(name, &["CREATE TABLE events (id INTEGER PRIMARY KEY, kind TEXT NOT NULL)"])
        .await
        .unwrap();
}

async fn count_events(manager: &DatabaseManager<Sqlite>, name: &str) -> i64 {
    let mut session = manager.session(name).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(&mut *session)
        .await
        .unwrap();
    session.close().await;
    count
}

#[tokio::test]
async fn test_named_databases_are_isolated() {
    let dir = TempDir::new().unwrap();
    let manager = Arc::new(DatabaseManager::<Sqlite>::new());
    manager.setup("default", &config(&dir, "main.db")).unwrap();
    manager.setup("analytics", &config(&dir, "analytics.db")).unwrap();
    create_events(&manager, "default").await;
    create_events(&manager, "analytics").await;

    let repository = SqlRepository::named(Arc::clone(&manager), "analytics");
    let mut session = repository.session().await.unwrap();
    for kind in ["login", "logout", "login"] {
        sqlx::query("INSERT INTO events (kind) VALUES (?)")
            .bind(kind)
            .execute(&mut *session)
            .await
            .unwrap();
    }
    session.commit().await.unwrap();

    assert_eq!(count_events(&manager, "analytics").await, 3);
    assert_eq!(count_events(&manager, "default").await, 0);

    assert!(manager.verify("default").await.unwrap());
    assert!(manager.verify("analytics").await.unwrap());

    manager.shutdown().await;
    assert!(manager.names().is_empty());
}

#[tokio::test]
async fn test_shutdown_of_one_manager_leaves_another_untouched() {
    let dir = TempDir::new().unwrap();
    let first = DatabaseManager::<Sqlite>::new();
    let second = DatabaseManager::<Sqlite>::new();
    first.setup("default", &config(&dir, "first.db")).unwrap();
    second.setup("default", &config(&dir, "second.db")).unwrap();

    first.shutdown().await;

    assert!(first.get_engine("default").is_err());
    assert!(second.verify("default").await.unwrap());
    second.shutdown().await;
}
