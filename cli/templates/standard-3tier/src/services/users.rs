//! User business rules

use sqlx::Sqlite;
use zd_infra::DbSession;
use zd_shared::{ApiError, PageParams, PagedResponse};

use crate::models::{NewUser, User};
use crate::repositories;

pub async fn list(
    session: &mut DbSession<Sqlite>,
    params: &PageParams,
) -> anyhow::Result<PagedResponse<User>> {
    Ok(repositories::users::page(session, params).await?)
}

pub async fn get(session: &mut DbSession<Sqlite>, id: i64) -> anyhow::Result<User> {
    repositories::users::find(session, id)
        .await?
        .ok_or_else(|| ApiError::not_found().with_message(format!("User {} not found", id)).into())
}

pub async fn create(session: &mut DbSession<Sqlite>, new_user: &NewUser) -> anyhow::Result<User> {
    if repositories::users::find_by_email(session, &new_user.email).await?.is_some() {
        return Err(ApiError::conflict()
            .with_message("Email already registered")
            .into());
    }
    Ok(repositories::users::insert(session, new_user).await?)
}
