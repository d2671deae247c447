//! Trace id middleware
//!
//! Reads the request id header, keeps it when it has the length of a
//! UUID and otherwise generates a fresh one. The id is the task-local
//! [`REQUEST_ID`] while the request is handled and is echoed back in the
//! response header, error responses included.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderName},
    Error,
};
use futures_util::future::LocalBoxFuture;
use zd_shared::config::trace::{TraceConfig, TRACE_ID_LENGTH};

use crate::context::REQUEST_ID;

type Generator = Arc<dyn Fn() -> String + Send + Sync>;

/// Trace id middleware factory
#[derive(Clone)]
pub struct TraceId {
    header: HeaderName,
    generator: Generator,
}

impl TraceId {
    /// `X-Request-ID` with UUID v4 generation
    pub fn new() -> Self {
        Self {
            header: HeaderName::from_static("x-request-id"),
            generator: Arc::new(|| uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Use the header name from configuration
    pub fn from_config(config: &TraceConfig) -> Result<Self, InvalidHeaderName> {
        let header = HeaderName::from_bytes(config.header_name.as_bytes())?;
        Ok(Self::new().with_header(header))
    }

    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }

    /// Replace the id generator
    pub fn with_generator<G>(mut self, generator: G) -> Self
    where
        G: Fn() -> String + Send + Sync + 'static,
    {
        self.generator = Arc::new(generator);
        self
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// The incoming id when acceptable, a generated one otherwise
    fn resolve(&self, incoming: Option<&HeaderValue>) -> String {
        incoming
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.len() == TRACE_ID_LENGTH)
            .map(str::to_owned)
            .unwrap_or_else(|| (self.generator)())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceId")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl<S, B> Transform<S, ServiceRequest> for TraceId
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceIdService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceIdService {
            service: Rc::new(service),
            config: self.clone(),
        }))
    }
}

/// Trace id middleware service implementation
pub struct TraceIdService<S> {
    service: Rc<S>,
    config: TraceId,
}

impl<S, B> Service<ServiceRequest> for TraceIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let header = self.config.header.clone();
        let request_id = self.config.resolve(req.headers().get(&header));

        Box::pin(REQUEST_ID.scope(request_id.clone(), async move {
            match service.call(req).await {
                Ok(mut res) => {
                    set_request_id(res.headers_mut(), header, &request_id);
                    Ok(res)
                }
                Err(err) => {
                    let mut response = err.error_response();
                    set_request_id(response.headers_mut(), header, &request_id);
                    Err(InternalError::from_response(err, response).into())
                }
            }
        }))
    }
}

fn set_request_id(headers: &mut HeaderMap, header: HeaderName, request_id: &str) {
    match HeaderValue::from_str(request_id) {
        Ok(value) => {
            headers.insert(header, value);
        }
        Err(_) => tracing::warn!(request_id = %request_id, "Request id is not a valid header value"),
    }
}
