//! Schema registry built from the plugin catalog
//!
//! Discovery walks the catalog once at startup. Packages that fail to load
//! are logged and skipped; the resulting registry is immutable.

use crate::plugins::{ModelPlugin, PluginCatalog};
use crate::schema::{PredictRequest, RequestSchema, ResponseSchema, normalize_name};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Registered bundle of schemas and implementations for one package
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    /// Normalized registry key
    pub name: String,
    /// Package name as registered
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<RequestSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<ResponseSchema>,
    /// Class names of the exported model implementations
    pub implementations: Vec<String>,
}

/// Outcome of a discovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    /// Normalized names registered, in discovery order
    pub registered: Vec<String>,
    /// Packages that failed to load, with the reason
    pub failed: Vec<(String, String)>,
}

/// Errors from matching a request against the registered schemas
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Request does not match any known schema (model_name '{model_name}')")]
    NoMatchingSchema { model_name: String },

    #[error("Request for '{model_name}' matches several schemas: {candidates:?}")]
    AmbiguousSchema {
        model_name: String,
        candidates: Vec<String>,
    },

    #[error("No corresponding ModelResponse schema found")]
    MissingResponseSchema { model_name: String },
}

/// Immutable mapping from normalized model name to descriptor
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    descriptors: BTreeMap<String, ModelDescriptor>,
    report: DiscoveryReport,
}

impl SchemaRegistry {
    /// Discover schemas from every package in the catalog
    pub fn discover(catalog: &PluginCatalog) -> Self {
        tracing::info!(models = ?catalog.package_names(), "Discovered model packages");

        let mut registry = Self::default();
        for plugin in catalog.iter() {
            registry.register_plugin(plugin.as_ref());
        }

        registry.warn_on_duplicate_literals();

        crate::metrics::update_registered_models(registry.len());
        tracing::info!(
            registered = registry.report.registered.len(),
            failed = registry.report.failed.len(),
            "Schema discovery complete"
        );

        registry
    }

    fn register_plugin(&mut self, plugin: &dyn ModelPlugin) {
        let package = plugin.package_name().to_string();

        let exports = match plugin.load() {
            Ok(exports) => exports,
            Err(e) => {
                tracing::error!(package = %package, error = %e, "Failed to load model package");
                crate::metrics::record_plugin_failed(&package);
                self.report.failed.push((package, e.to_string()));
                return;
            }
        };

        let name = normalize_name(&package);

        match &exports.request_schema {
            Some(schema) => tracing::info!(
                model = %name,
                schema = %schema.title,
                "Registered ModelRequest"
            ),
            None => tracing::warn!(package = %package, "No ModelRequest schema found"),
        }
        match &exports.response_schema {
            Some(schema) => tracing::info!(
                model = %name,
                schema = %schema.title,
                "Registered ModelResponse"
            ),
            None => tracing::warn!(package = %package, "No ModelResponse schema found"),
        }

        let descriptor = ModelDescriptor {
            name: name.clone(),
            package: package.clone(),
            request_schema: exports.request_schema,
            response_schema: exports.response_schema,
            implementations: exports
                .implementations
                .iter()
                .map(|i| i.class_name.to_string())
                .collect(),
        };

        if let Some(previous) = self.descriptors.insert(name.clone(), descriptor) {
            tracing::warn!(
                model = %name,
                previous = %previous.package,
                package = %package,
                "Model name collision, keeping the last discovered package"
            );
            self.report.registered.retain(|n| n != &name);
        }

        crate::metrics::record_plugin_loaded(&name);
        self.report.registered.push(name);
    }

    fn warn_on_duplicate_literals(&self) {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for descriptor in self.descriptors.values() {
            if let Some(schema) = &descriptor.request_schema
                && let Some(other) = seen.insert(&schema.model_name, &descriptor.name)
            {
                tracing::warn!(
                    model_name = %schema.model_name,
                    first = %other,
                    second = %descriptor.name,
                    "Request schemas share a model_name; requests for it will be rejected"
                );
            }
        }
    }

    /// Get a descriptor by normalized name
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.descriptors.get(name)
    }

    /// All descriptors, sorted by name
    pub fn descriptors(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.descriptors.values()
    }

    /// Registered request schemas keyed by model name
    pub fn request_schemas(&self) -> impl Iterator<Item = (&str, &RequestSchema)> {
        self.descriptors
            .values()
            .filter_map(|d| d.request_schema.as_ref().map(|s| (d.name.as_str(), s)))
    }

    /// Response schema registered under exactly `name`
    pub fn response_schema(&self, name: &str) -> Option<&ResponseSchema> {
        self.descriptors
            .get(name)
            .and_then(|d| d.response_schema.as_ref())
    }

    pub fn report(&self) -> &DiscoveryReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Match a request against the union of registered request schemas
    ///
    /// Exactly one schema must accept the request.
    pub fn validate(&self, request: &PredictRequest) -> Result<&ModelDescriptor, DispatchError> {
        let mut matches = self
            .descriptors
            .values()
            .filter(|d| d.request_schema.as_ref().is_some_and(|s| s.accepts(request)));

        let Some(first) = matches.next() else {
            return Err(DispatchError::NoMatchingSchema {
                model_name: request.model_name.clone(),
            });
        };

        let rest: Vec<&ModelDescriptor> = matches.collect();
        if !rest.is_empty() {
            let candidates = std::iter::once(first)
                .chain(rest)
                .map(|d| d.name.clone())
                .collect();
            return Err(DispatchError::AmbiguousSchema {
                model_name: request.model_name.clone(),
                candidates,
            });
        }

        Ok(first)
    }

    /// Validate a request and resolve its response schema by exact key
    pub fn resolve(
        &self,
        request: &PredictRequest,
    ) -> Result<(&ModelDescriptor, &ResponseSchema), DispatchError> {
        let descriptor = self.validate(request)?;
        let response = self.response_schema(&descriptor.name).ok_or_else(|| {
            DispatchError::MissingResponseSchema {
                model_name: request.model_name.clone(),
            }
        })?;
        Ok((descriptor, response))
    }
}
