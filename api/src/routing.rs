//! Enveloped route registration
//!
//! [`ApiRouter`] registers handlers on an actix-web [`Scope`] through
//! [`Enveloped`], so every return value goes through [`IntoEnvelope`], and
//! records a [`RouteDoc`] per route for the OpenAPI document.

use actix_web::{http::Method, web, FromRequest, Handler, HttpResponse, Scope};
use futures_util::future::LocalBoxFuture;

use crate::response::{IntoEnvelope, ResponseDoc};

/// Description of the main response of every route
pub const SUCCESS_DESCRIPTION: &str = "Successful Response";

/// Handler adapter converting the output of `F` with [`IntoEnvelope`]
#[derive(Clone)]
pub struct Enveloped<F> {
    handler: F,
}

impl<F> Enveloped<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

/// Wrap a handler so its output is enveloped
pub fn enveloped<F>(handler: F) -> Enveloped<F> {
    Enveloped::new(handler)
}

impl<F, Args> Handler<Args> for Enveloped<F>
where
    F: Handler<Args>,
    F::Output: IntoEnvelope + 'static,
    F::Future: 'static,
    Args: 'static,
{
    type Output = HttpResponse;
    type Future = LocalBoxFuture<'static, HttpResponse>;

    fn call(&self, args: Args) -> Self::Future {
        let future = self.handler.call(args);
        Box::pin(async move { future.await.into_envelope() })
    }
}

/// One documented response of a route
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentedResponse {
    pub status: u16,
    pub description: String,
    pub doc: ResponseDoc,
}

/// Documentation of a registered route
#[derive(Debug, Clone)]
pub struct RouteDoc {
    pub method: Method,
    /// Full path in OpenAPI form (`/users/{id}`)
    pub path: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub responses: Vec<DocumentedResponse>,
}

impl RouteDoc {
    /// Names of the path parameters, in order
    pub fn path_params(&self) -> Vec<&str> {
        self.path
            .split('{')
            .skip(1)
            .filter_map(|part| part.split('}').next())
            .collect()
    }

    /// Documented response for `status`
    pub fn response(&self, status: u16) -> Option<&DocumentedResponse> {
        self.responses.iter().find(|response| response.status == status)
    }
}

/// A scope whose routes are enveloped and documented
pub struct ApiRouter {
    prefix: String,
    scope: Scope,
    tags: Vec<String>,
    routes: Vec<RouteDoc>,
}

impl ApiRouter {
    /// Router mounted at `prefix` (`""` for the application root)
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            prefix: prefix.to_string(),
            scope: web::scope(prefix),
            tags: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Tag every route of this router
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Register `handler` for `method` on `path`
    pub fn route<F, Args>(mut self, path: &str, method: Method, handler: F) -> Self
    where
        F: Handler<Args>,
        F::Output: IntoEnvelope + 'static,
        F::Future: 'static,
        Args: FromRequest + 'static,
    {
        self.scope = self
            .scope
            .route(path, web::method(method.clone()).to(Enveloped::new(handler)));

        let full_path = openapi_path(&format!("{}{}", self.prefix, path));
        self.routes.push(RouteDoc {
            method,
            path: if full_path.is_empty() { "/".to_string() } else { full_path },
            summary: None,
            tags: Vec::new(),
            responses: vec![DocumentedResponse {
                status: 200,
                description: SUCCESS_DESCRIPTION.to_string(),
                doc: <F::Output as IntoEnvelope>::response_doc(),
            }],
        });
        self
    }

    pub fn get<F, Args>(self, path: &str, handler: F) -> Self
    where
        F: Handler<Args>,
        F::Output: IntoEnvelope + 'static,
        F::Future: 'static,
        Args: FromRequest + 'static,
    {
        self.route(path, Method::GET, handler)
    }

    pub fn post<F, Args>(self, path: &str, handler: F) -> Self
    where
        F: Handler<Args>,
        F::Output: IntoEnvelope + 'static,
        F::Future: 'static,
        Args: FromRequest + 'static,
    {
        self.route(path, Method::POST, handler)
    }

    pub fn put<F, Args>(self, path: &str, handler: F) -> Self
    where
        F: Handler<Args>,
        F::Output: IntoEnvelope + 'static,
        F::Future: 'static,
        Args: FromRequest + 'static,
    {
        self.route(path, Method::PUT, handler)
    }

    pub fn patch<F, Args>(self, path: &str, handler: F) -> Self
    where
        F: Handler<Args>,
        F::Output: IntoEnvelope + 'static,
        F::Future: 'static,
        Args: FromRequest + 'static,
    {
        self.route(path, Method::PATCH, handler)
    }

    pub fn delete<F, Args>(self, path: &str, handler: F) -> Self
    where
        F: Handler<Args>,
        F::Output: IntoEnvelope + 'static,
        F::Future: 'static,
        Args: FromRequest + 'static,
    {
        self.route(path, Method::DELETE, handler)
    }

    /// Summary of the most recently registered route
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        match self.routes.last_mut() {
            Some(route) => route.summary = Some(summary.into()),
            None => tracing::warn!("summary() called before any route was registered"),
        }
        self
    }

    /// Declare an additional response of the most recently registered route.
    ///
    /// `M` is wrapped in the envelope unless it already is one.
    pub fn response<M: IntoEnvelope>(mut self, status: u16, description: impl Into<String>) -> Self {
        let Some(route) = self.routes.last_mut() else {
            tracing::warn!(status, "response() called before any route was registered");
            return self;
        };
        let entry = DocumentedResponse {
            status,
            description: description.into(),
            doc: M::response_doc(),
        };
        match route.responses.iter_mut().find(|existing| existing.status == status) {
            Some(existing) => *existing = entry,
            None => route.responses.push(entry),
        }
        self
    }

    /// Documentation recorded so far
    pub fn routes(&self) -> &[RouteDoc] {
        &self.routes
    }

    /// The actix scope and the route documentation
    pub fn into_parts(self) -> (Scope, Vec<RouteDoc>) {
        let tags = self.tags;
        let routes = self
            .routes
            .into_iter()
            .map(|mut route| {
                route.tags.extend(tags.iter().cloned());
                route
            })
            .collect();
        (self.scope, routes)
    }
}

/// Strip regex constraints from path parameters: `{id:\d+}` becomes `{id}`
fn openapi_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    let mut skipping = false;
    for ch in path.chars() {
        match ch {
            '{' => {
                depth += 1;
                if !skipping {
                    out.push(ch);
                }
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    skipping = false;
                    out.push(ch);
                } else if !skipping {
                    out.push(ch);
                }
            }
            ':' if depth == 1 => skipping = true,
            _ if !skipping => out.push(ch),
            _ => {}
        }
    }
    out
}
