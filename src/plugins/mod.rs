//! Model packages and the catalog they are registered in
//!
//! A model package exports a request schema, a response schema and one or
//! more [`ModelInterface`] implementations. Packages become visible to the
//! registries by an explicit [`PluginCatalog::register`] call; the bundled
//! packages are registered by [`PluginCatalog::builtin`].

pub mod decision_tree;
pub mod linear_regression;

use crate::models::ModelInterface;
use crate::schema::{RequestSchema, ResponseSchema, normalize_name};
use std::sync::Arc;
use thiserror::Error;

pub use decision_tree::DecisionTreePlugin;
pub use linear_regression::LinearRegressionPlugin;

/// Errors raised while loading a package
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Model package {package} not found")]
    NotFound { package: String },

    #[error("Error loading model package {package}: {reason}")]
    LoadFailed { package: String, reason: String },
}

/// Constructor for a model implementation
pub type ModelFactory = fn() -> Box<dyn ModelInterface>;

/// A concrete model type exported by a package
#[derive(Clone, Copy)]
pub struct ModelImplementation {
    /// Type name used as the CLI command group, e.g. `DecisionTreeModel`
    pub class_name: &'static str,
    pub factory: ModelFactory,
}

impl std::fmt::Debug for ModelImplementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelImplementation")
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}

/// Everything a package exports once loaded
///
/// Any part may be missing; the registries record whatever is present.
#[derive(Debug, Default, Clone)]
pub struct PluginExports {
    pub request_schema: Option<RequestSchema>,
    pub response_schema: Option<ResponseSchema>,
    pub implementations: Vec<ModelImplementation>,
}

/// A model package
pub trait ModelPlugin: Send + Sync {
    /// Package name, normalized into the registry key
    fn package_name(&self) -> &str;

    /// Load the package's exports
    fn load(&self) -> Result<PluginExports, PluginError>;
}

/// Ordered set of registered model packages
#[derive(Clone, Default)]
pub struct PluginCatalog {
    plugins: Vec<Arc<dyn ModelPlugin>>,
}

impl PluginCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the bundled model packages
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(Arc::new(DecisionTreePlugin));
        catalog.register(Arc::new(LinearRegressionPlugin));
        catalog
    }

    /// Register a package; discovery visits packages in registration order
    pub fn register(&mut self, plugin: Arc<dyn ModelPlugin>) -> &mut Self {
        tracing::debug!(package = plugin.package_name(), "Model package registered");
        self.plugins.push(plugin);
        self
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with(mut self, plugin: Arc<dyn ModelPlugin>) -> Self {
        self.register(plugin);
        self
    }

    /// Drop packages whose normalized name is listed in `disabled`
    pub fn without(self, disabled: &[String]) -> Self {
        if disabled.is_empty() {
            return self;
        }

        let disabled: Vec<String> = disabled.iter().map(|n| normalize_name(n)).collect();
        let plugins = self
            .plugins
            .into_iter()
            .filter(|p| {
                let keep = !disabled.contains(&normalize_name(p.package_name()));
                if !keep {
                    tracing::info!(
                        package = p.package_name(),
                        "Model package disabled by configuration"
                    );
                }
                keep
            })
            .collect();

        Self { plugins }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ModelPlugin>> {
        self.plugins.iter()
    }

    /// Package names in discovery order
    pub fn package_names(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|p| p.package_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
