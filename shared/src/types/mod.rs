//! Type definitions module
//!
//! - `pagination` - Page parameters and paged results
//! - `response` - The `{code, data, message}` response envelope
//! - `schema` - Timestamps and id schemas shared by DTOs and models

pub mod pagination;
pub mod response;
pub mod schema;

pub use pagination::{PageParams, PagedResponse};
pub use response::{ApiResponse, SUCCESS_CODE, SUCCESS_MESSAGE};
pub use schema::{
    ensure_utc, utc_datetime, utc_now, IntIdSchema, Timestamped, Timestamps, UuidSchema,
};
