//! Error handlers
//!
//! - `exception` - error to envelope mapping, extractor error handlers, catch-all

pub mod exception;

pub use exception::{
    api_error_response, catch_all, error_response, register_exception_handlers, HttpError,
};
