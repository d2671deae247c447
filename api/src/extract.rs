//! Request extractors
//!
//! Validating wrappers around `web::Json`/`web::Query` and a database
//! session bound to the request.

use std::ops::{Deref, DerefMut};

use actix_web::{dev::Payload as RequestPayload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde::de::DeserializeOwned;
use serde_json::json;
use sqlx::Database;
use validator::Validate;
use zd_infra::{DatabaseError, DatabaseManager, DbSession, DEFAULT_DB_NAME};
use zd_shared::ApiError;

use crate::handlers::HttpError;

/// JSON body that passed `validator` checks; failures are 422 envelopes
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut RequestPayload) -> Self::Future {
        let json = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let web::Json(value) = json.await?;
            value.validate().map_err(HttpError::from)?;
            Ok(ValidatedJson(value))
        })
    }
}

/// Query string that passed `validator` checks; failures are 422 envelopes
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> ValidatedQuery<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
{
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut RequestPayload) -> Self::Future {
        let result = web::Query::<T>::from_query(req.query_string())
            .map_err(|err| {
                HttpError::from(ApiError::validation(json!([{
                    "loc": ["query"],
                    "msg": err.to_string(),
                    "type": "value_error",
                }])))
            })
            .and_then(|web::Query(value)| {
                value.validate()?;
                Ok(value)
            })
            .map(ValidatedQuery)
            .map_err(actix_web::Error::from);
        ready(result)
    }
}

/// A transaction on the default database for the duration of a handler.
///
/// Requires `web::Data<DatabaseManager<DB>>` in the app data. Dropping the
/// session without [`Session::commit`] rolls back.
pub struct Session<DB: Database>(DbSession<DB>);

impl<DB: Database> Session<DB> {
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.0.commit().await
    }

    pub fn into_inner(self) -> DbSession<DB> {
        self.0
    }
}

impl<DB: Database> Deref for Session<DB> {
    type Target = DbSession<DB>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<DB: Database> DerefMut for Session<DB> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<DB: Database> FromRequest for Session<DB> {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut RequestPayload) -> Self::Future {
        let manager = req.app_data::<web::Data<DatabaseManager<DB>>>().cloned();
        Box::pin(async move {
            let Some(manager) = manager else {
                tracing::error!("DatabaseManager is not registered as app data");
                return Err(HttpError::from(ApiError::internal()).into());
            };
            let session = manager
                .session(DEFAULT_DB_NAME)
                .await
                .map_err(|err| HttpError::from(ApiError::from(err)))?;
            Ok(Session(session))
        })
    }
}
