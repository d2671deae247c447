//! Business error taxonomy
//!
//! Each [`ErrorKind`] carries a fixed HTTP status and default message.
//! An [`ApiError`] may override the business code, the message and the
//! attached data independently; anything left unset keeps the kind's default.

use serde_json::Value;
use thiserror::Error;

use crate::types::ApiResponse;

/// Error tags with their HTTP semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    /// Input failed validation
    Unprocessable,
    /// Anything without a more specific tag
    Internal,
}

impl ErrorKind {
    /// HTTP status code of this kind
    pub const fn http_status(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Unprocessable => 422,
            ErrorKind::Internal => 500,
        }
    }

    /// Message used when none is supplied
    pub const fn default_message(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Unprocessable => "Unprocessable Entity",
            ErrorKind::Internal => "Internal Server Error",
        }
    }

    /// Kinds whose details may be shown to clients
    pub const fn is_client_error(self) -> bool {
        self.http_status() < 500
    }
}

/// A business rule violation raised by application code
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "{} ({}): {}",
    .kind.http_status(),
    .kind.default_message(),
    .message.as_deref().unwrap_or(.kind.default_message())
)]
pub struct ApiError {
    kind: ErrorKind,
    code: Option<i32>,
    message: Option<String>,
    data: Option<Value>,
}

impl ApiError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            code: None,
            message: None,
            data: None,
        }
    }

    pub fn bad_request() -> Self {
        Self::new(ErrorKind::BadRequest)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorKind::Forbidden)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn conflict() -> Self {
        Self::new(ErrorKind::Conflict)
    }

    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    /// Validation failure carrying the error details as data
    pub fn validation(details: Value) -> Self {
        Self::new(ErrorKind::Unprocessable).with_data(details)
    }

    /// Override the business code
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Override the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach data to the error envelope
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    /// Business code, defaulting to the HTTP status
    pub fn code(&self) -> i32 {
        self.code.unwrap_or(i32::from(self.kind.http_status()))
    }

    /// Message, defaulting to the kind's text
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or(self.kind.default_message())
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Render as the response envelope
    pub fn to_envelope(&self) -> ApiResponse<Value> {
        ApiResponse::create(
            self.http_status(),
            Some(self.code()),
            self.data.clone(),
            self.message(),
        )
    }
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        Self::validation(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_KINDS: [ErrorKind; 7] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::Unprocessable,
        ErrorKind::Internal,
    ];

    #[test]
    fn test_defaults_for_every_kind() {
        for kind in ALL_KINDS {
            let envelope = ApiError::new(kind).to_envelope();
            assert_eq!(envelope.code, i32::from(kind.http_status()));
            assert_eq!(envelope.data, None);
            assert_eq!(envelope.message, kind.default_message());
            assert_eq!(envelope.http_status, kind.http_status());
        }
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        for kind in ALL_KINDS {
            let only_message = ApiError::new(kind).with_message("custom").to_envelope();
            assert_eq!(only_message.message, "custom");
            assert_eq!(only_message.code, i32::from(kind.http_status()));
            assert_eq!(only_message.data, None);

            let only_code = ApiError::new(kind).with_code(10001).to_envelope();
            assert_eq!(only_code.code, 10001);
            assert_eq!(only_code.message, kind.default_message());
            assert_eq!(only_code.http_status, kind.http_status());

            let only_data = ApiError::new(kind).with_data(json!({"field": "name"})).to_envelope();
            assert_eq!(only_data.data, Some(json!({"field": "name"})));
            assert_eq!(only_data.code, i32::from(kind.http_status()));
            assert_eq!(only_data.message, kind.default_message());
        }
    }

    #[test]
    fn test_named_constructors() {
        assert_eq!(ApiError::bad_request().http_status(), 400);
        assert_eq!(ApiError::unauthorized().http_status(), 401);
        assert_eq!(ApiError::forbidden().http_status(), 403);
        assert_eq!(ApiError::not_found().http_status(), 404);
        assert_eq!(ApiError::conflict().http_status(), 409);
        assert_eq!(ApiError::internal().http_status(), 500);
        assert!(ApiError::conflict().kind().is_client_error());
        assert!(!ApiError::internal().kind().is_client_error());
    }

    #[test]
    fn test_display() {
        let error = ApiError::not_found().with_message("user 7 missing");
        assert_eq!(error.to_string(), "404 (Not Found): user 7 missing");
        assert_eq!(ApiError::conflict().to_string(), "409 (Conflict): Conflict");
        let source: &dyn std::error::Error = &error;
        assert!(source.source().is_none());
    }
}
