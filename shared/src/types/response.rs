//! API response envelope
//!
//! Every business payload leaves the service as `{code, data, message}`.
//! The HTTP status travels next to the envelope but is never serialized.

use serde::{Deserialize, Serialize};

/// Business code used for successful responses
pub const SUCCESS_CODE: i32 = 0;

/// Default message of a successful response
pub const SUCCESS_MESSAGE: &str = "Success";

/// Standard API response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Business status code
    pub code: i32,

    /// Response payload, `null` when absent
    pub data: Option<T>,

    /// Response message
    #[serde(default)]
    pub message: String,

    /// HTTP status the envelope is sent with
    #[serde(skip, default = "default_http_status")]
    pub http_status: u16,
}

impl<T> ApiResponse<T> {
    /// Create a successful response: `{code: 0, data, message: "Success"}`
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            data: Some(data),
            message: SUCCESS_MESSAGE.to_string(),
            http_status: 200,
        }
    }

    /// Create a response for an arbitrary HTTP status.
    ///
    /// The business `code` falls back to the HTTP status when not provided.
    pub fn create(
        http_status: u16,
        code: Option<i32>,
        data: Option<T>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.unwrap_or(i32::from(http_status)),
            data,
            message: message.into(),
            http_status,
        }
    }

    /// 200 OK with business code 0
    pub fn ok(data: Option<T>) -> Self {
        Self::create(200, Some(SUCCESS_CODE), data, SUCCESS_MESSAGE)
    }

    /// 201 Created
    pub fn created(data: Option<T>) -> Self {
        Self::create(201, None, data, "Created")
    }

    /// 400 Bad Request
    pub fn bad_request() -> Self {
        Self::create(400, None, None, "Bad Request")
    }

    /// 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::create(401, None, None, "Unauthorized")
    }

    /// 403 Forbidden
    pub fn forbidden() -> Self {
        Self::create(403, None, None, "Forbidden")
    }

    /// 404 Not Found
    pub fn not_found() -> Self {
        Self::create(404, None, None, "Not Found")
    }

    /// 409 Conflict
    pub fn conflict() -> Self {
        Self::create(409, None, None, "Conflict")
    }

    /// 422 Unprocessable Entity
    pub fn unprocessable_entity() -> Self {
        Self::create(422, None, None, "Unprocessable Entity")
    }

    /// 500 Internal Server Error
    pub fn server_error() -> Self {
        Self::create(500, None, None, "Internal Server Error")
    }

    /// Override the business code
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    /// Override the message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a payload
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Check if the business code signals success
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Extract the data, consuming the response
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Map the data to a different type
    pub fn map<U, F>(self, f: F) -> ApiResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        ApiResponse {
            code: self.code,
            data: self.data.map(f),
            message: self.message,
            http_status: self.http_status,
        }
    }
}

fn default_http_status() -> u16 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::success(json!({"id": 1}));
        assert_eq!(response.code, 0);
        assert_eq!(response.message, "Success");
        assert_eq!(response.http_status, 200);
        assert!(response.is_success());
    }

    #[test]
    fn test_serialized_shape() {
        let response: ApiResponse<i32> = ApiResponse::not_found();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"code": 404, "data": null, "message": "Not Found"}));
    }

    #[test]
    fn test_code_defaults_to_http_status() {
        let response: ApiResponse<()> = ApiResponse::create(418, None, None, "teapot");
        assert_eq!(response.code, 418);

        let created = ApiResponse::created(Some("x"));
        assert_eq!(created.code, 201);
        assert_eq!(created.http_status, 201);

        let ok: ApiResponse<()> = ApiResponse::ok(None);
        assert_eq!(ok.code, 0);
        assert_eq!(ok.http_status, 200);
    }

    #[test]
    fn test_overrides() {
        let response = ApiResponse::conflict()
            .with_code(4091)
            .with_message("User already exists")
            .with_data("alice");
        assert_eq!(response.code, 4091);
        assert_eq!(response.message, "User already exists");
        assert_eq!(response.data, Some("alice"));
        assert_eq!(response.http_status, 409);
    }

    #[test]
    fn test_map() {
        let response = ApiResponse::success(2).map(|n| n * 10);
        assert_eq!(response.into_data(), Some(20));
    }
}
