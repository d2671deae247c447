//! Outbound HTTP with trace propagation
//!
//! [`TracedClient`] wraps a `reqwest::Client` and stamps every request built
//! inside a traced request with the current request id, so downstream
//! services log under the same id. Request hooks run after the id is set.
//!
//! ```ignore
//! let client = TracedClient::new().with_base_url("http://billing:8000");
//! let invoices = client.get("/invoices").send().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderName, InvalidHeaderName};
use reqwest::{Client, Method, RequestBuilder};
use zd_shared::config::TraceConfig;

use crate::context::current_request_id;

type RequestHook = Arc<dyn Fn(RequestBuilder) -> RequestBuilder + Send + Sync>;

/// HTTP client forwarding the current trace id
#[derive(Clone)]
pub struct TracedClient {
    inner: Client,
    base_url: Option<String>,
    header: HeaderName,
    hooks: Vec<RequestHook>,
}

impl TracedClient {
    /// Client sending `X-Request-ID`
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Wrap a configured `reqwest::Client`
    pub fn with_client(inner: Client) -> Self {
        Self {
            inner,
            base_url: None,
            header: HeaderName::from_static("x-request-id"),
            hooks: Vec::new(),
        }
    }

    /// Client with a request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let inner = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(inner))
    }

    /// Use the header name from configuration
    pub fn from_config(config: &TraceConfig) -> Result<Self, InvalidHeaderName> {
        let header = HeaderName::from_bytes(config.header_name.as_bytes())?;
        Ok(Self::new().with_header(header))
    }

    /// Prefix for relative request paths
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }

    /// Add a hook applied to every request after the trace header
    pub fn with_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(RequestBuilder) -> RequestBuilder + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Build a request for `url`, absolute or relative to the base URL
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self.inner.request(method, self.resolve(url));
        if let Some(request_id) = current_request_id() {
            builder = builder.header(self.header.clone(), request_id);
        }
        self.hooks.iter().fold(builder, |builder, hook| hook(builder))
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !is_absolute(url) => {
                format!("{}/{}", base, url.trim_start_matches('/'))
            }
            _ => url.to_string(),
        }
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TracedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracedClient")
            .field("base_url", &self.base_url)
            .field("header", &self.header)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
