//! Discovery tests with misbehaving model packages
//!
//! Verifies that a broken package never aborts discovery of the others and
//! that partially exported packages still register what they have.

use modulus::{
    CommandRegistry, PluginCatalog, SchemaRegistry,
    models::{LinearRegressionModel, ModelInterface},
    plugins::{ModelImplementation, ModelPlugin, PluginError, PluginExports},
    schema::{RequestSchema, ResponseSchema},
};
use std::sync::Arc;

/// Package whose load always fails
struct BrokenPlugin;

impl ModelPlugin for BrokenPlugin {
    fn package_name(&self) -> &str {
        "model-broken"
    }

    fn load(&self) -> Result<PluginExports, PluginError> {
        Err(PluginError::LoadFailed {
            package: self.package_name().to_string(),
            reason: "missing native dependency".to_string(),
        })
    }
}

/// Package that cannot be found at all
struct MissingPlugin;

impl ModelPlugin for MissingPlugin {
    fn package_name(&self) -> &str {
        "model-missing"
    }

    fn load(&self) -> Result<PluginExports, PluginError> {
        Err(PluginError::NotFound {
            package: self.package_name().to_string(),
        })
    }
}

/// Package with a configurable subset of exports
struct PartialPlugin {
    name: &'static str,
    request: bool,
    response: bool,
    implementation: bool,
}

fn create_linear() -> Box<dyn ModelInterface> {
    Box::new(LinearRegressionModel::new())
}

impl ModelPlugin for PartialPlugin {
    fn package_name(&self) -> &str {
        self.name
    }

    fn load(&self) -> Result<PluginExports, PluginError> {
        let model_name = modulus::schema::normalize_name(self.name);
        Ok(PluginExports {
            request_schema: self
                .request
                .then(|| RequestSchema::new("PartialRequest", model_name)),
            response_schema: self.response.then(|| ResponseSchema::new("PartialResponse")),
            implementations: if self.implementation {
                vec![ModelImplementation {
                    class_name: "PartialModel",
                    factory: create_linear,
                }]
            } else {
                Vec::new()
            },
        })
    }
}

#[test]
fn test_one_descriptor_per_package() {
    let registry = SchemaRegistry::discover(&PluginCatalog::builtin());

    assert_eq!(registry.len(), 2);
    let names: Vec<_> = registry.descriptors().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["decision_tree", "linear_regression"]);

    let tree = registry.get("decision_tree").unwrap();
    assert_eq!(tree.package, "model-decision-tree");
    assert_eq!(tree.implementations, vec!["DecisionTreeModel"]);
    assert!(tree.request_schema.is_some());
    assert!(tree.response_schema.is_some());
}

#[test]
fn test_failing_package_does_not_abort_discovery() {
    let catalog = PluginCatalog::new()
        .with(Arc::new(BrokenPlugin))
        .with(Arc::new(MissingPlugin))
        .with(Arc::new(modulus::plugins::DecisionTreePlugin))
        .with(Arc::new(modulus::plugins::LinearRegressionPlugin));

    let registry = SchemaRegistry::discover(&catalog);

    assert_eq!(registry.len(), 2);
    assert!(registry.get("broken").is_none());
    assert!(registry.get("missing").is_none());

    let failed: Vec<_> = registry
        .report()
        .failed
        .iter()
        .map(|(package, _)| package.as_str())
        .collect();
    assert_eq!(failed, vec!["model-broken", "model-missing"]);
    assert!(registry.report().failed[0].1.contains("missing native dependency"));
    assert!(registry.report().failed[1].1.contains("not found"));
}

#[test]
fn test_missing_response_schema_keeps_request_schema() {
    let catalog = PluginCatalog::new().with(Arc::new(PartialPlugin {
        name: "model-only-request",
        request: true,
        response: false,
        implementation: false,
    }));

    let registry = SchemaRegistry::discover(&catalog);
    let descriptor = registry.get("only_request").unwrap();

    assert!(descriptor.request_schema.is_some());
    assert!(descriptor.response_schema.is_none());
    assert_eq!(registry.request_schemas().count(), 1);
}

#[test]
fn test_missing_request_schema_keeps_response_schema() {
    let catalog = PluginCatalog::new().with(Arc::new(PartialPlugin {
        name: "model-only-response",
        request: false,
        response: true,
        implementation: false,
    }));

    let registry = SchemaRegistry::discover(&catalog);

    assert!(registry.get("only_response").unwrap().request_schema.is_none());
    assert!(registry.response_schema("only_response").is_some());
    assert_eq!(registry.request_schemas().count(), 0);
}

#[test]
fn test_command_discovery_skips_broken_and_empty_packages() {
    let catalog = PluginCatalog::new()
        .with(Arc::new(BrokenPlugin))
        .with(Arc::new(PartialPlugin {
            name: "model-no-impl",
            request: true,
            response: true,
            implementation: false,
        }))
        .with(Arc::new(modulus::plugins::DecisionTreePlugin));

    let registry = CommandRegistry::discover(&catalog);

    let names: Vec<_> = registry.groups().map(|g| g.name()).collect();
    assert_eq!(names, vec!["DecisionTreeModel"]);
}

#[test]
fn test_plugin_registered_at_startup_gets_commands() {
    let catalog = PluginCatalog::builtin().with(Arc::new(PartialPlugin {
        name: "model-partial",
        request: true,
        response: true,
        implementation: true,
    }));

    let commands = CommandRegistry::discover(&catalog);
    assert_eq!(commands.len(), 3);

    let out = commands
        .run("PartialModel", "extract", &["1,2;3,4".to_string()])
        .unwrap();
    assert_eq!(out, "[[1.0, 2.0], [3.0, 4.0]]");

    let schemas = SchemaRegistry::discover(&catalog);
    assert!(schemas.get("partial").is_some());
}

#[test]
fn test_empty_catalog() {
    let catalog = PluginCatalog::new();
    assert!(SchemaRegistry::discover(&catalog).is_empty());
    assert!(CommandRegistry::discover(&catalog).is_empty());
}
