//! OpenAPI document generated from the registered schemas

use crate::registry::SchemaRegistry;
use serde_json::{Map, Value, json};

const OPENAPI_VERSION: &str = "3.1.0";

fn reference(title: &str) -> Value {
    json!({"$ref": format!("#/components/schemas/{}", title)})
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": reference("ErrorResponse")}},
    })
}

fn simple_get(summary: &str, description: &str) -> Value {
    json!({"summary": summary, "responses": {"200": {"description": description}}})
}

/// Build the OpenAPI document for the current registry
///
/// The `/predict` request body is the union of every registered request
/// schema; its response is the union of every registered response schema.
pub fn document(registry: &SchemaRegistry) -> Value {
    let mut schemas = Map::new();
    let mut requests = Vec::new();
    let mut responses = Vec::new();

    for descriptor in registry.descriptors() {
        if let Some(schema) = &descriptor.request_schema {
            requests.push(reference(&schema.title));
            schemas.insert(schema.title.clone(), schema.json_schema());
        }
        if let Some(schema) = &descriptor.response_schema {
            responses.push(reference(&schema.title));
            schemas.insert(schema.title.clone(), schema.json_schema());
        }
    }

    schemas.insert(
        "ErrorResponse".to_string(),
        json!({
            "type": "object",
            "required": ["detail", "timestamp"],
            "properties": {
                "detail": {"type": "string"},
                "timestamp": {"type": "string", "format": "date-time"},
            },
        }),
    );

    let mut request_body = json!({
        "required": true,
        "content": {"application/json": {"schema": {"oneOf": requests}}},
    });
    if let Some((_, schema)) = registry.request_schemas().next() {
        request_body["content"]["application/json"]["example"] =
            json!({"model_name": schema.model_name, "values": ["1", "2", "3"]});
    }

    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "Modulus",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/predict": {
                "post": {
                    "summary": "Validate a request and answer with the matching response schema",
                    "requestBody": request_body,
                    "responses": {
                        "200": {
                            "description": "Prediction response",
                            "content": {
                                "application/json": {"schema": {"oneOf": responses}},
                            },
                        },
                        "422": error_response("Request matches no registered schema"),
                        "500": error_response("Ambiguous request or missing response schema"),
                    },
                },
            },
            "/health": {"get": simple_get("Service health", "Healthy")},
            "/models": {"get": simple_get("Registered models", "Model descriptors")},
            "/models/{name}": {
                "get": {
                    "summary": "One registered model",
                    "parameters": [{
                        "name": "name",
                        "in": "path",
                        "required": true,
                        "schema": {"type": "string"},
                    }],
                    "responses": {
                        "200": {"description": "Model descriptor"},
                        "404": error_response("Model is not registered"),
                    },
                },
            },
            "/metrics": {"get": simple_get("Prometheus metrics", "Metrics in text format")},
        },
        "components": {"schemas": schemas},
    })
}
