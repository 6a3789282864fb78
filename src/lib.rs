//! Modulus - plugin framework for machine-learning model wrappers
//!
//! Model packages register their request/response schemas and model
//! implementations in a [`PluginCatalog`]. At startup the catalog is walked
//! once to build an immutable [`SchemaRegistry`] (backing the HTTP
//! prediction API) and a [`CommandRegistry`] (backing the generated CLI).

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod plugins;
pub mod registry;
pub mod schema;

pub use commands::{CommandError, CommandGroup, CommandRegistry};
pub use config::ModulusConfig;
pub use error::ApiError;
pub use models::{DecisionTreeModel, LinearRegressionModel, ModelError, ModelInterface};
pub use plugins::{ModelPlugin, PluginCatalog, PluginError, PluginExports};
pub use registry::{DispatchError, ModelDescriptor, SchemaRegistry};
pub use schema::{PredictRequest, PredictResponse, RequestSchema, ResponseSchema};
