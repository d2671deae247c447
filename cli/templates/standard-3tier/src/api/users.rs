//! User routes

use actix_web::web;
use sqlx::Sqlite;
use zd_api::{ApiRouter, Session, ValidatedJson, ValidatedQuery};
use zd_shared::{ApiResponse, PageParams, PagedResponse};

use crate::models::{NewUser, User};
use crate::services;

pub fn router() -> ApiRouter {
    ApiRouter::new("/users")
        .tag("users")
        .get("", list_users)
        .summary("List users")
        .get("/{id:\\d+}", get_user)
        .summary("Get a user")
        .response::<ApiResponse<()>>(404, "User not found")
        .post("", create_user)
        .summary("Create a user")
        .response::<ApiResponse<()>>(409, "Email already registered")
}

async fn list_users(
    mut session: Session<Sqlite>,
    params: ValidatedQuery<PageParams>,
) -> anyhow::Result<PagedResponse<User>> {
    services::users::list(&mut session, &params).await
}

async fn get_user(mut session: Session<Sqlite>, id: web::Path<i64>) -> anyhow::Result<User> {
    services::users::get(&mut session, id.into_inner()).await
}

async fn create_user(
    mut session: Session<Sqlite>,
    body: ValidatedJson<NewUser>,
) -> anyhow::Result<ApiResponse<User>> {
    let user = services::users::create(&mut session, &body).await?;
    session.commit().await?;
    Ok(ApiResponse::created(Some(user)))
}
