//! Mapping of errors to envelope responses
//!
//! Business errors ([`ApiError`]) keep their status, code, message and data.
//! Validation failures become 422. Anything else is logged in full and sent
//! to the client as a generic 500 envelope.

use actix_web::{
    body::EitherBody,
    dev::ServiceResponse,
    error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError},
    http::{header, StatusCode},
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    web, HttpRequest, HttpResponse, ResponseError,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;
use zd_infra::DatabaseError;
use zd_shared::{ApiError, ApiResponse, ErrorKind};

use crate::response::envelope_response;

/// An [`ApiError`] that actix-web can render
#[derive(Debug, Error)]
#[error(transparent)]
pub struct HttpError(#[from] ApiError);

impl HttpError {
    pub fn api_error(&self) -> &ApiError {
        &self.0
    }

    pub fn into_inner(self) -> ApiError {
        self.0
    }
}

impl From<ValidationErrors> for HttpError {
    fn from(errors: ValidationErrors) -> Self {
        Self(ApiError::from(errors))
    }
}

impl From<ErrorKind> for HttpError {
    fn from(kind: ErrorKind) -> Self {
        Self(ApiError::new(kind))
    }
}

impl ResponseError for HttpError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        envelope_response(&self.0.to_envelope())
    }
}

/// Envelope response for a business error
pub fn api_error_response(error: &ApiError) -> HttpResponse {
    envelope_response(&error.to_envelope())
}

/// Map any handler error to its envelope response.
///
/// Known error types are matched first; unknown errors are logged with
/// their full chain and hidden behind a generic message.
pub fn error_response(error: anyhow::Error) -> HttpResponse {
    let error = match error.downcast::<ApiError>() {
        Ok(api_error) => return api_error_response(&api_error),
        Err(error) => error,
    };
    let error = match error.downcast::<HttpError>() {
        Ok(http_error) => return api_error_response(http_error.api_error()),
        Err(error) => error,
    };
    let error = match error.downcast::<ValidationErrors>() {
        Ok(errors) => return api_error_response(&ApiError::from(errors)),
        Err(error) => error,
    };
    let error = match error.downcast::<DatabaseError>() {
        Ok(db_error) => return api_error_response(&ApiError::from(db_error)),
        Err(error) => error,
    };

    tracing::error!(error = ?error, "Unhandled error: {:#}", error);
    api_error_response(&ApiError::internal())
}

fn validation_error(location: &str, detail: String) -> actix_web::Error {
    tracing::debug!(location, detail = %detail, "Request validation failed");
    HttpError::from(ApiError::validation(json!([{
        "loc": [location],
        "msg": detail,
        "type": "value_error",
    }])))
    .into()
}

fn json_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    validation_error("body", error.to_string())
}

fn query_error(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    validation_error("query", error.to_string())
}

fn path_error(error: PathError, _req: &HttpRequest) -> actix_web::Error {
    validation_error("path", error.to_string())
}

fn form_error(error: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    validation_error("form", error.to_string())
}

async fn not_found() -> HttpResponse {
    api_error_response(&ApiError::not_found())
}

/// Install extractor error handlers and the 404 default service.
///
/// ```ignore
/// App::new().configure(register_exception_handlers)
/// ```
pub fn register_exception_handlers(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::FormConfig::default().error_handler(form_error))
        .default_service(web::route().to(not_found));
}

/// Middleware rewriting framework error responses into envelopes
///
/// Responses that are already JSON are left alone.
pub fn catch_all<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().default_handler(rewrite_error_response)
}

fn is_json(response: &HttpResponse<impl Sized>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

fn rewrite_error_response<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    if is_json(res.response()) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let status = res.status();
    let envelope: ApiResponse<()> = if status.is_server_error() {
        match res.response().error() {
            Some(error) => tracing::error!(status = status.as_u16(), "Unhandled error: {}", error),
            None => tracing::error!(status = status.as_u16(), "Unhandled error response"),
        }
        ApiResponse::create(status.as_u16(), None, None, ErrorKind::Internal.default_message())
    } else {
        ApiResponse::create(
            status.as_u16(),
            None,
            None,
            status.canonical_reason().unwrap_or("Error"),
        )
    };

    let (req, _) = res.into_parts();
    let response = envelope_response(&envelope).map_into_right_body::<B>();
    Ok(ErrorHandlerResponse::Response(ServiceResponse::<EitherBody<B>>::new(
        req, response,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: HttpResponse) -> Value {
        let body = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[actix_web::test]
    async fn test_api_error_keeps_overrides() {
        let error = ApiError::conflict().with_code(40901).with_message("User exists");
        let response = error_response(error.into());
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await,
            json!({"code": 40901, "data": null, "message": "User exists"})
        );
    }

    #[actix_web::test]
    async fn test_unknown_error_is_generic() {
        let response = error_response(anyhow::anyhow!("connection reset by peer"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"code": 500, "data": null, "message": "Internal Server Error"})
        );
    }

    #[actix_web::test]
    async fn test_database_errors() {
        let missing = DatabaseError::NotInitialized {
            name: "analytics".to_string(),
        };
        let response = error_response(missing.into());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal Server Error");

        let invalid = zd_shared::PageParams::new(1, 0).unwrap_err();
        let response = error_response(DatabaseError::InvalidPage(invalid).into());
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_http_error_status() {
        let error = HttpError::from(ErrorKind::Forbidden);
        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(error.to_string(), "403 (Forbidden): Forbidden");
    }
}
