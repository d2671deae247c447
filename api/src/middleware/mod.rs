//! Request middleware
//!
//! - `trace_id` - request id propagation through the `X-Request-ID` header
//! - `access_log` - one structured log line per request
//!
//! `AccessLog` must run inside `TraceId` so its line carries the request
//! id. actix-web runs the last `wrap` first:
//!
//! ```ignore
//! App::new()
//!     .wrap(catch_all())
//!     .wrap(AccessLog::new())
//!     .wrap(TraceId::new())
//! ```

pub mod access_log;
pub mod trace_id;

pub use access_log::AccessLog;
pub use trace_id::TraceId;
