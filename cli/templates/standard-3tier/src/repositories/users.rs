//! User persistence

use sqlx::Sqlite;
use zd_infra::database::{timestamped_table, Dialect};
use zd_infra::{paginate, DatabaseError, DbSession};
use zd_shared::{PageParams, PagedResponse};

use crate::models::{NewUser, User};

/// Table and `updated_at` trigger DDL
pub fn schema() -> Vec<String> {
    timestamped_table(
        Dialect::Sqlite,
        "users",
        "id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, email TEXT NOT NULL UNIQUE",
    )
}

const SELECT_USERS: &str = "SELECT id, name, email, created_at, updated_at FROM users";

pub async fn page(
    session: &mut DbSession<Sqlite>,
    params: &PageParams,
) -> Result<PagedResponse<User>, DatabaseError> {
    paginate::<Sqlite, User>(&mut **session, params, &format!("{} ORDER BY id", SELECT_USERS)).await
}

pub async fn find(session: &mut DbSession<Sqlite>, id: i64) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_USERS))
        .bind(id)
        .fetch_optional(&mut **session)
        .await?;
    Ok(user)
}

pub async fn find_by_email(
    session: &mut DbSession<Sqlite>,
    email: &str,
) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as(&format!("{} WHERE email = ?", SELECT_USERS))
        .bind(email)
        .fetch_optional(&mut **session)
        .await?;
    Ok(user)
}

pub async fn insert(session: &mut DbSession<Sqlite>, new_user: &NewUser) -> Result<User, DatabaseError> {
    let id = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
        .bind(&new_user.name)
        .bind(&new_user.email)
        .execute(&mut **session)
        .await?
        .last_insert_rowid();
    find(session, id)
        .await?
        .ok_or(DatabaseError::Sqlx(sqlx::Error::RowNotFound))
}
