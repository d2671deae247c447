//! # API Layer
//!
//! actix-web glue for zodiac services:
//! - **Response wrapping**: handlers return business values, clients get `{code, data, message}`
//! - **Routing**: [`ApiRouter`] registers enveloped routes and documents them
//! - **OpenAPI**: a 3.1 document with `Response_<Name>` components
//! - **Errors**: business, validation and unexpected errors mapped to envelopes
//! - **Middleware**: request trace ids and access logging
//! - **Logging**: `tracing` subscriber setup with service and request id stamping
//! - **Outbound HTTP**: [`TracedClient`] forwards the request id to other services

pub mod context;
pub mod extract;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod routing;

pub use context::current_request_id;
pub use extract::{Session, ValidatedJson, ValidatedQuery};
pub use handlers::{catch_all, register_exception_handlers, HttpError};
pub use http::TracedClient;
pub use logging::{setup_logging, LoggingGuard, ServiceFormat};
pub use middleware::{AccessLog, TraceId};
pub use openapi::OpenApi;
pub use response::{envelope_response, IntoEnvelope, Payload, ResponseDoc};
pub use routing::{enveloped, ApiRouter, Enveloped, RouteDoc};
