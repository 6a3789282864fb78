//! Request/response schemas exported by model packages

use serde::{Deserialize, Serialize};

/// Namespace prefix carried by fully-qualified package names
const NAMESPACE_PREFIX: &str = "modulus_models_";
/// Conventional prefix of model package names
const PACKAGE_PREFIX: &str = "model_";

/// Prediction request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub model_name: String,
    pub values: Vec<String>,
}

/// Prediction response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub message: String,
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Shape of requests a model package accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSchema {
    /// Schema type name, e.g. `DecisionTreeRequest`
    pub title: String,
    /// The only `model_name` value this schema accepts
    pub model_name: String,
    /// Minimum number of entries in `values`
    pub min_values: usize,
    pub description: String,
}

impl RequestSchema {
    pub fn new(title: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            model_name: model_name.into(),
            min_values: 0,
            description: String::new(),
        }
    }

    pub fn with_min_values(mut self, min_values: usize) -> Self {
        self.min_values = min_values;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether `request` satisfies this schema
    pub fn accepts(&self, request: &PredictRequest) -> bool {
        request.model_name == self.model_name && request.values.len() >= self.min_values
    }

    /// JSON Schema object describing accepted request bodies
    pub fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "description": self.description,
            "type": "object",
            "required": ["model_name", "values"],
            "properties": {
                "model_name": {"type": "string", "const": self.model_name},
                "values": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": self.min_values,
                },
            },
        })
    }
}

/// Shape of responses a model package produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseSchema {
    /// Schema type name, e.g. `DecisionTreeResponse`
    pub title: String,
    pub description: String,
}

impl ResponseSchema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// JSON Schema object describing produced response bodies
    pub fn json_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "description": self.description,
            "type": "object",
            "required": ["message", "data"],
            "properties": {
                "message": {"type": "string"},
                "data": {"type": "object"},
            },
        })
    }

    /// Build the response for a validated request
    ///
    /// No inference happens here: the data is an echo of the request.
    pub fn respond(&self, request: &PredictRequest) -> PredictResponse {
        let mut data = serde_json::Map::new();
        data.insert(
            "model_name".to_string(),
            serde_json::Value::String(request.model_name.clone()),
        );
        data.insert(
            "values".to_string(),
            serde_json::Value::Array(
                request
                    .values
                    .iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect(),
            ),
        );

        PredictResponse {
            message: format!("Prediction successful for {}", request.model_name),
            data,
        }
    }
}

/// Derive the registry key from a package name
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `_`, trims leading/trailing `_`, then strips the namespace and
/// package prefixes: `modulus.models.model_decision_tree` and
/// `model-decision-tree` both become `decision_tree`.
pub fn normalize_name(package: &str) -> String {
    let mut collapsed = String::with_capacity(package.len());
    let mut pending_sep = false;

    for ch in package.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !collapsed.is_empty() {
                collapsed.push('_');
            }
            pending_sep = false;
            collapsed.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }

    let mut name = collapsed.as_str();
    if let Some(rest) = name.strip_prefix(NAMESPACE_PREFIX) {
        name = rest;
    }
    if let Some(rest) = name.strip_prefix(PACKAGE_PREFIX) {
        name = rest;
    }

    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_package_names() {
        assert_eq!(normalize_name("model-decision-tree"), "decision_tree");
        assert_eq!(
            normalize_name("modulus.models.model_linear_regression"),
            "linear_regression"
        );
        assert_eq!(normalize_name("  Model__Fancy..Thing "), "fancy_thing");
        assert_eq!(normalize_name("kmeans"), "kmeans");
        assert_eq!(normalize_name("---"), "");
    }

    #[test]
    fn test_normalize_keeps_bare_prefix() {
        // Nothing left to strip into
        assert_eq!(normalize_name("model"), "model");
    }

    #[test]
    fn test_request_json_schema() {
        let schema = RequestSchema::new("TreeRequest", "decision_tree")
            .with_min_values(2)
            .with_description("Tree input");
        let json = schema.json_schema();

        assert_eq!(json["title"], "TreeRequest");
        assert_eq!(json["properties"]["model_name"]["const"], "decision_tree");
        assert_eq!(json["properties"]["values"]["minItems"], 2);
        assert_eq!(json["required"], serde_json::json!(["model_name", "values"]));
    }

    #[test]
    fn test_request_schema_accepts() {
        let schema = RequestSchema::new("TreeRequest", "decision_tree").with_min_values(1);

        let ok = PredictRequest {
            model_name: "decision_tree".to_string(),
            values: vec!["a".to_string()],
        };
        assert!(schema.accepts(&ok));

        let empty = PredictRequest {
            values: vec![],
            ..ok.clone()
        };
        assert!(!schema.accepts(&empty));

        let other = PredictRequest {
            model_name: "decision".to_string(),
            ..ok
        };
        assert!(!schema.accepts(&other));
    }

    #[test]
    fn test_response_echoes_request() {
        let schema = ResponseSchema::new("TreeResponse");
        let request = PredictRequest {
            model_name: "decision_tree".to_string(),
            values: vec!["a".to_string(), "b".to_string()],
        };

        let response = schema.respond(&request);
        assert_eq!(response.message, "Prediction successful for decision_tree");
        assert_eq!(
            serde_json::Value::Object(response.data),
            serde_json::json!({"model_name": "decision_tree", "values": ["a", "b"]})
        );
    }

    #[test]
    fn test_request_deserialize_requires_values() {
        let parsed: Result<PredictRequest, _> =
            serde_json::from_str(r#"{"model_name": "decision_tree"}"#);
        assert!(parsed.is_err());
    }
}
