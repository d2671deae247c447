//! OpenAPI 3.1 document for enveloped routes
//!
//! Every enveloped response is referenced as
//! `#/components/schemas/Response_<Name>`; the component describes the
//! envelope with the payload schema inlined under `data`. Generic payloads
//! sharing a name but not a schema get numbered components
//! (`Response_Data`, `Response_Data_2`, ...).

use std::sync::Arc;

use actix_web::{web, HttpResponse, Resource, Scope};
use serde_json::{json, Map, Value};
use zd_shared::types::{SUCCESS_CODE, SUCCESS_MESSAGE};

use crate::response::ResponseDoc;
use crate::routing::{ApiRouter, DocumentedResponse, RouteDoc};

pub const OPENAPI_VERSION: &str = "3.1.0";

/// Collects route documentation from mounted routers
#[derive(Debug, Clone)]
pub struct OpenApi {
    title: String,
    version: String,
    routes: Vec<RouteDoc>,
}

impl OpenApi {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            routes: Vec::new(),
        }
    }

    /// Record the router's documentation and hand back its scope
    pub fn mount(&mut self, router: ApiRouter) -> Scope {
        let (scope, routes) = router.into_parts();
        self.routes.extend(routes);
        scope
    }

    pub fn routes(&self) -> &[RouteDoc] {
        &self.routes
    }

    /// Build the OpenAPI document
    pub fn document(&self) -> Value {
        let mut paths = Map::new();
        let mut schemas = Map::new();

        for route in &self.routes {
            let mut responses = Map::new();
            for response in &route.responses {
                let component = match &response.doc {
                    ResponseDoc::Envelope { name, data } => {
                        Some(register_component(&mut schemas, name, data))
                    }
                    ResponseDoc::Raw => None,
                };
                responses.insert(
                    response.status.to_string(),
                    response_object(response, component.as_deref()),
                );
            }

            let mut operation = Map::new();
            if let Some(summary) = &route.summary {
                operation.insert("summary".to_string(), json!(summary));
            }
            if !route.tags.is_empty() {
                operation.insert("tags".to_string(), json!(route.tags));
            }
            operation.insert("operationId".to_string(), json!(operation_id(route)));
            let parameters: Vec<Value> = route
                .path_params()
                .into_iter()
                .map(|name| {
                    json!({
                        "name": name,
                        "in": "path",
                        "required": true,
                        "schema": {"type": "string"},
                    })
                })
                .collect();
            if !parameters.is_empty() {
                operation.insert("parameters".to_string(), Value::Array(parameters));
            }
            operation.insert("responses".to_string(), Value::Object(responses));

            let item = paths
                .entry(route.path.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(item) = item {
                item.insert(route.method.as_str().to_lowercase(), Value::Object(operation));
            }
        }

        json!({
            "openapi": OPENAPI_VERSION,
            "info": {"title": self.title, "version": self.version},
            "paths": paths,
            "components": {"schemas": schemas},
        })
    }

    /// GET resource serving the document as JSON
    pub fn service(&self, path: &str) -> Resource {
        let document = Arc::new(self.document());
        web::resource(path).route(web::get().to(move || {
            let document = Arc::clone(&document);
            async move { HttpResponse::Ok().json(document.as_ref()) }
        }))
    }
}

fn operation_id(route: &RouteDoc) -> String {
    let path: String = route
        .path
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    format!("{}{}", route.method.as_str().to_lowercase(), path.trim_end_matches('_'))
}

/// Name under which the envelope of `data` is stored, registering it if new
fn register_component(schemas: &mut Map<String, Value>, name: &str, data: &Value) -> String {
    let mut candidate = name.to_string();
    let mut suffix = 1;
    loop {
        match schemas.get(&candidate) {
            None => {
                schemas.insert(candidate.clone(), envelope_schema(&candidate, data));
                return candidate;
            }
            Some(existing) if envelope_data(existing) == Some(data) => return candidate,
            Some(_) => {
                suffix += 1;
                candidate = format!("{}_{}", name, suffix);
            }
        }
    }
}

fn envelope_data(schema: &Value) -> Option<&Value> {
    schema.pointer("/properties/data/anyOf/0")
}

fn response_object(response: &DocumentedResponse, component: Option<&str>) -> Value {
    match component {
        Some(name) => json!({
            "description": response.description,
            "content": {
                "application/json": {
                    "schema": {"$ref": format!("#/components/schemas/{}", name)},
                },
            },
        }),
        None => json!({"description": response.description}),
    }
}

/// Component schema of `Response_<Name>`
pub fn envelope_schema(name: &str, data: &Value) -> Value {
    json!({
        "title": name,
        "type": "object",
        "properties": {
            "code": {"type": "integer", "title": "Code", "default": SUCCESS_CODE},
            "data": {"anyOf": [data, {"type": "null"}], "title": "Data"},
            "message": {"type": "string", "title": "Message", "default": SUCCESS_MESSAGE},
        },
        "required": ["code", "message"],
    })
}
