//! Response wrapping
//!
//! Handlers return plain business values; [`IntoEnvelope`] decides
//! statically whether the value still needs the `{code, data, message}`
//! envelope. Business types opt in through [`Payload`], which also carries
//! the schema used for the OpenAPI document.

use std::collections::HashMap;

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::{json, Value};
use zd_shared::{ApiResponse, PagedResponse};

use crate::handlers::exception::error_response;

/// Name used for payloads without a meaningful type name
pub const GENERIC_SCHEMA_NAME: &str = "Data";

/// Prefix of wrapped component names
pub const ENVELOPE_PREFIX: &str = "Response_";

/// A business type that may be returned from an enveloped handler
pub trait Payload: Serialize {
    /// Component name of the type in the OpenAPI document
    fn schema_name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// JSON schema of the type
    fn schema() -> Value {
        json!({"type": "object", "title": Self::schema_name()})
    }
}

/// Last path segment of a type name with generic arguments stripped
pub fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Implement [`Payload`] with the default name and schema
///
/// ```ignore
/// payload!(User, Group);
/// ```
#[macro_export]
macro_rules! payload {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::response::Payload for $ty {})+
    };
}

macro_rules! scalar_payload {
    ($json_type:literal => $($ty:ty),+) => {
        $(impl Payload for $ty {
            fn schema_name() -> String {
                GENERIC_SCHEMA_NAME.to_string()
            }

            fn schema() -> Value {
                json!({"type": $json_type})
            }
        })+
    };
}

scalar_payload!("integer" => i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);
scalar_payload!("number" => f32, f64);
scalar_payload!("boolean" => bool);
scalar_payload!("string" => String, &'static str);

impl Payload for () {
    fn schema_name() -> String {
        GENERIC_SCHEMA_NAME.to_string()
    }

    fn schema() -> Value {
        json!({"type": "null"})
    }
}

impl Payload for Value {
    fn schema_name() -> String {
        GENERIC_SCHEMA_NAME.to_string()
    }

    fn schema() -> Value {
        json!({})
    }
}

impl<T: Payload> Payload for Option<T> {
    fn schema_name() -> String {
        GENERIC_SCHEMA_NAME.to_string()
    }

    fn schema() -> Value {
        json!({"anyOf": [T::schema(), {"type": "null"}]})
    }
}

impl<T: Payload> Payload for Vec<T> {
    fn schema_name() -> String {
        format!("List_{}", T::schema_name())
    }

    fn schema() -> Value {
        json!({"type": "array", "items": T::schema()})
    }
}

impl<T: Payload> Payload for HashMap<String, T> {
    fn schema_name() -> String {
        GENERIC_SCHEMA_NAME.to_string()
    }

    fn schema() -> Value {
        json!({"type": "object", "additionalProperties": T::schema()})
    }
}

impl<T: Payload> Payload for PagedResponse<T> {
    fn schema_name() -> String {
        format!("Paged_{}", T::schema_name())
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "title": Self::schema_name(),
            "properties": {
                "items": {"type": "array", "items": T::schema()},
                "total": {"type": "integer"},
                "page": {"type": "integer"},
                "size": {"type": "integer"},
            },
            "required": ["items", "total", "page", "size"],
        })
    }
}

/// Documentation of one response a route may produce
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseDoc {
    /// An envelope around a payload schema
    Envelope {
        /// Component name, `Response_<Name>`
        name: String,
        /// Schema of the `data` field
        data: Value,
    },
    /// A raw response that bypasses the envelope
    Raw,
}

impl ResponseDoc {
    /// Documentation of an envelope around `T`
    pub fn envelope<T: Payload>() -> Self {
        ResponseDoc::Envelope {
            name: format!("{}{}", ENVELOPE_PREFIX, T::schema_name()),
            data: T::schema(),
        }
    }

    /// Component name, `None` for raw responses
    pub fn component_name(&self) -> Option<&str> {
        match self {
            ResponseDoc::Envelope { name, .. } => Some(name),
            ResponseDoc::Raw => None,
        }
    }
}

/// Conversion of a handler result into the final HTTP response
///
/// Business payloads are wrapped exactly once; envelopes and raw
/// responses pass through untouched.
pub trait IntoEnvelope {
    fn into_envelope(self) -> HttpResponse;

    /// How the response is documented
    fn response_doc() -> ResponseDoc;
}

impl<T: Payload> IntoEnvelope for T {
    fn into_envelope(self) -> HttpResponse {
        envelope_response(&ApiResponse::success(self))
    }

    fn response_doc() -> ResponseDoc {
        ResponseDoc::envelope::<T>()
    }
}

impl<T: Payload> IntoEnvelope for ApiResponse<T> {
    fn into_envelope(self) -> HttpResponse {
        envelope_response(&self)
    }

    fn response_doc() -> ResponseDoc {
        ResponseDoc::envelope::<T>()
    }
}

impl IntoEnvelope for HttpResponse {
    fn into_envelope(self) -> HttpResponse {
        self
    }

    fn response_doc() -> ResponseDoc {
        ResponseDoc::Raw
    }
}

impl<T, E> IntoEnvelope for Result<T, E>
where
    T: IntoEnvelope,
    E: Into<anyhow::Error>,
{
    fn into_envelope(self) -> HttpResponse {
        match self {
            Ok(value) => value.into_envelope(),
            Err(error) => error_response(error.into()),
        }
    }

    fn response_doc() -> ResponseDoc {
        T::response_doc()
    }
}

/// Serialize an envelope with its HTTP status
pub fn envelope_response<T: Serialize>(envelope: &ApiResponse<T>) -> HttpResponse {
    let status =
        StatusCode::from_u16(envelope.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(envelope)
}
