//! Pagination over arbitrary base queries
//!
//! The total is counted by wrapping the base query in a sub-select, so
//! queries with joins, grouping or ordering need no dedicated count query.

use sqlx::database::HasArguments;
use sqlx::{Database, Executor, FromRow, IntoArguments};
use validator::Validate;
use zd_shared::{PageParams, PagedResponse};

use crate::DatabaseError;

/// Alias of the counting sub-select
const COUNT_ALIAS: &str = "_zd_count";

/// The count and slice statements derived from one base query
///
/// Use it directly when the base query has bind parameters: bind the same
/// values to both statements.
///
/// ```ignore
/// let page = PageQuery::new("SELECT id, name FROM users WHERE active = ?", &params)?;
/// let total: i64 = sqlx::query_scalar(page.count_sql()).bind(true).fetch_one(&mut *conn).await?;
/// let rows: Vec<User> = sqlx::query_as(page.slice_sql()).bind(true).fetch_all(&mut *conn).await?;
/// let response = page.into_response(rows, total);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    count_sql: String,
    slice_sql: String,
    params: PageParams,
}

impl PageQuery {
    /// Derive the statements, validating `params` first
    pub fn new(base_sql: &str, params: &PageParams) -> Result<Self, DatabaseError> {
        params.validate()?;

        let base = base_sql.trim().trim_end_matches(';').trim_end();
        Ok(Self {
            count_sql: format!("SELECT COUNT(*) FROM ({base}) AS {COUNT_ALIAS}"),
            slice_sql: format!(
                "{base} LIMIT {} OFFSET {}",
                params.limit(),
                params.offset()
            ),
            params: *params,
        })
    }

    /// Statement returning the total number of rows of the base query
    pub fn count_sql(&self) -> &str {
        &self.count_sql
    }

    /// Statement returning the requested page
    pub fn slice_sql(&self) -> &str {
        &self.slice_sql
    }

    pub fn params(&self) -> &PageParams {
        &self.params
    }

    /// Combine the fetched rows and count into a paged response
    pub fn into_response<T>(self, items: Vec<T>, total: i64) -> PagedResponse<T> {
        PagedResponse::create(items, u64::try_from(total).unwrap_or_default(), &self.params)
    }
}

/// Fetch one page of `base_sql`.
///
/// `params` are validated before anything is executed. The base query should
/// carry its own `ORDER BY` for stable pages.
pub async fn paginate<DB, T>(
    conn: &mut DB::Connection,
    params: &PageParams,
    base_sql: &str,
) -> Result<PagedResponse<T>, DatabaseError>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> <DB as HasArguments<'q>>::Arguments: IntoArguments<'q, DB>,
    T: for<'r> FromRow<'r, DB::Row> + Send + Unpin,
    (i64,): for<'r> FromRow<'r, DB::Row>,
{
    let page = PageQuery::new(base_sql, params)?;

    let (total,): (i64,) = sqlx::query_as::<DB, (i64,)>(page.count_sql())
        .fetch_one(&mut *conn)
        .await?;
    let items: Vec<T> = sqlx::query_as::<DB, T>(page.slice_sql())
        .fetch_all(&mut *conn)
        .await?;

    tracing::debug!(
        page = page.params().page,
        size = page.params().size,
        total,
        "Fetched page"
    );
    Ok(page.into_response(items, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_for_third_page() {
        let params = PageParams::new(3, 10).unwrap();
        let page = PageQuery::new("SELECT id FROM items ORDER BY id;", &params).unwrap();
        assert_eq!(
            page.count_sql(),
            "SELECT COUNT(*) FROM (SELECT id FROM items ORDER BY id) AS _zd_count"
        );
        assert_eq!(page.slice_sql(), "SELECT id FROM items ORDER BY id LIMIT 10 OFFSET 20");
    }

    #[test]
    fn test_invalid_params_rejected() {
        for size in [0, 101] {
            let params = PageParams { page: 1, size };
            let result = PageQuery::new("SELECT 1", &params);
            assert!(matches!(result, Err(DatabaseError::InvalidPage(_))));
        }
        let params = PageParams { page: 0, size: 10 };
        assert!(PageQuery::new("SELECT 1", &params).is_err());
    }

    #[test]
    fn test_into_response_echoes_params() {
        let params = PageParams::new(2, 5).unwrap();
        let page = PageQuery::new("SELECT 1", &params).unwrap();
        let response = page.into_response(vec!["a", "b"], 7);
        assert_eq!(response.total, 7);
        assert_eq!(response.page, 2);
        assert_eq!(response.size, 5);
        assert_eq!(response.items, vec!["a", "b"]);
    }
}
