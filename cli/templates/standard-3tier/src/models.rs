use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use zd_api::payload;

#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    #[validate(email)]
    pub email: String,
}

payload!(User);
