//! SQL helpers for models carrying ids and timestamps
//!
//! Server-side defaults keep `created_at` / `updated_at` in UTC regardless of
//! the database session time zone. `updated_at` is refreshed by the database
//! on every `UPDATE` (a column clause on MySQL, a trigger elsewhere), so
//! plain SQL writes cannot leave it stale.

use sqlx::Database;

/// Function shared by the Postgres `updated_at` triggers
const PG_TOUCH_FUNCTION: &str = "zd_touch_updated_at";

/// SQL dialects with known UTC timestamp expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Dialect of a SQLx backend, by its driver name
    pub fn of<DB: Database>() -> Option<Self> {
        Self::from_name(DB::NAME)
    }

    /// Dialect from a driver name (`PostgreSQL`, `MySQL`, `SQLite`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    /// Dialect from a connection URL scheme
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split_once(':').map(|(scheme, _)| scheme)?;
        match scheme {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    /// Column type storing a UTC timestamp
    pub fn timestamp_type(self) -> &'static str {
        match self {
            Dialect::Postgres => "TIMESTAMP WITH TIME ZONE",
            Dialect::MySql => "DATETIME(6)",
            Dialect::Sqlite => "TIMESTAMP",
        }
    }

    /// Auto-incrementing integer primary key column
    pub fn int_id_column(self) -> &'static str {
        match self {
            Dialect::Postgres => "id BIGSERIAL PRIMARY KEY",
            Dialect::MySql => "id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY",
            Dialect::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    /// UUID primary key column
    pub fn uuid_id_column(self) -> &'static str {
        match self {
            Dialect::Postgres => "id UUID PRIMARY KEY",
            Dialect::MySql => "id CHAR(36) NOT NULL PRIMARY KEY",
            Dialect::Sqlite => "id TEXT NOT NULL PRIMARY KEY",
        }
    }
}

/// Expression evaluating to the current UTC time
pub fn utc_now_sql(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Postgres => "timezone('utc', now())",
        Dialect::MySql => "UTC_TIMESTAMP()",
        Dialect::Sqlite => "datetime('now')",
    }
}

/// `created_at` and `updated_at` column definitions with UTC defaults.
///
/// Pair them with [`updated_at_triggers`], or use [`timestamped_table`].
pub fn timestamp_columns(dialect: Dialect) -> String {
    let ty = dialect.timestamp_type();
    let now = utc_now_sql(dialect);
    let on_update = match dialect {
        Dialect::MySql => " ON UPDATE CURRENT_TIMESTAMP(6)",
        Dialect::Postgres | Dialect::Sqlite => "",
    };
    format!(
        "created_at {ty} NOT NULL DEFAULT ({now}), \
         updated_at {ty} NOT NULL DEFAULT ({now}){on_update}"
    )
}

/// Statements refreshing `updated_at` on every `UPDATE` of `table`.
///
/// An update that assigns `updated_at` itself keeps the assigned value.
/// MySQL needs none: the column definition carries `ON UPDATE`.
pub fn updated_at_triggers(dialect: Dialect, table: &str) -> Vec<String> {
    let now = utc_now_sql(dialect);
    let trigger = format!("{table}_touch_updated_at");
    match dialect {
        Dialect::Sqlite => vec![format!(
            "CREATE TRIGGER IF NOT EXISTS {trigger} AFTER UPDATE ON {table} FOR EACH ROW \
             WHEN NEW.updated_at IS OLD.updated_at \
             BEGIN UPDATE {table} SET updated_at = {now} WHERE rowid = NEW.rowid; END"
        )],
        Dialect::Postgres => vec![
            format!(
                "CREATE OR REPLACE FUNCTION {PG_TOUCH_FUNCTION}() RETURNS TRIGGER AS $$ \
                 BEGIN \
                 IF NEW.updated_at IS NOT DISTINCT FROM OLD.updated_at THEN \
                 NEW.updated_at := {now}; \
                 END IF; \
                 RETURN NEW; \
                 END; $$ LANGUAGE plpgsql"
            ),
            format!("DROP TRIGGER IF EXISTS {trigger} ON {table}"),
            format!(
                "CREATE TRIGGER {trigger} BEFORE UPDATE ON {table} FOR EACH ROW \
                 EXECUTE FUNCTION {PG_TOUCH_FUNCTION}()"
            ),
        ],
        Dialect::MySql => Vec::new(),
    }
}

/// `CREATE TABLE` for `table` with `columns` plus the timestamp columns,
/// followed by its `updated_at` triggers.
///
/// ```ignore
/// let ddl = timestamped_table(Dialect::Sqlite, "notes", "id INTEGER PRIMARY KEY, body TEXT NOT NULL");
/// manager.create_all("default", &ddl).await?;
/// ```
pub fn timestamped_table(dialect: Dialect, table: &str, columns: &str) -> Vec<String> {
    let mut statements = vec![format!(
        "CREATE TABLE IF NOT EXISTS {table} ({columns}, {})",
        timestamp_columns(dialect)
    )];
    statements.extend(updated_at_triggers(dialect, table));
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_now_per_dialect() {
        assert_eq!(utc_now_sql(Dialect::Postgres), "timezone('utc', now())");
        assert_eq!(utc_now_sql(Dialect::MySql), "UTC_TIMESTAMP()");
        assert_eq!(utc_now_sql(Dialect::Sqlite), "datetime('now')");
    }

    #[test]
    fn test_dialect_detection() {
        assert_eq!(Dialect::from_url("postgres://u:p@db/app"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_url("sqlite://app.db"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_url("sqlite::memory:"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_url("oracle://db"), None);
        assert_eq!(Dialect::of::<sqlx::Sqlite>(), Some(Dialect::Sqlite));
    }

    #[test]
    fn test_timestamp_columns() {
        assert_eq!(
            timestamp_columns(Dialect::Sqlite),
            "created_at TIMESTAMP NOT NULL DEFAULT (datetime('now')), \
             updated_at TIMESTAMP NOT NULL DEFAULT (datetime('now'))"
        );
        assert!(timestamp_columns(Dialect::MySql).ends_with("ON UPDATE CURRENT_TIMESTAMP(6)"));
    }

    #[test]
    fn test_updated_at_triggers_per_dialect() {
        let sqlite = updated_at_triggers(Dialect::Sqlite, "notes");
        assert_eq!(sqlite.len(), 1);
        assert!(sqlite[0].starts_with("CREATE TRIGGER IF NOT EXISTS notes_touch_updated_at AFTER UPDATE ON notes"));
        assert!(sqlite[0].contains("SET updated_at = datetime('now')"));

        let postgres = updated_at_triggers(Dialect::Postgres, "notes");
        assert_eq!(postgres.len(), 3);
        assert!(postgres[0].contains("NEW.updated_at := timezone('utc', now())"));
        assert!(postgres[2].contains("BEFORE UPDATE ON notes"));

        assert!(updated_at_triggers(Dialect::MySql, "notes").is_empty());
    }

    #[test]
    fn test_timestamped_table() {
        let statements = timestamped_table(Dialect::Sqlite, "notes", "id INTEGER PRIMARY KEY");
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS notes (id INTEGER PRIMARY KEY, created_at"));
        assert!(statements[1].starts_with("CREATE TRIGGER"));
    }
}
