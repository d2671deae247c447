//! Request-scoped trace context
//!
//! The request id lives in a Tokio task-local set by the
//! [`TraceId`](crate::middleware::TraceId) middleware for exactly the
//! lifetime of one request future. Concurrent requests never observe each
//! other's ids and nothing remains set once the request completes.

use std::future::Future;

tokio::task_local! {
    /// Trace id of the request being handled on this task
    pub static REQUEST_ID: String;
}

/// Trace id of the current request, `None` outside request scope
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}

/// Run `future` with `request_id` as the current trace id
pub async fn with_request_id<F: Future>(request_id: String, future: F) -> F::Output {
    REQUEST_ID.scope(request_id, future).await
}
