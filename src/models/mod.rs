//! Model lifecycle interface and the bundled model implementations
//!
//! Provides:
//! - The [`ModelInterface`] trait every pluggable model implements
//! - Tabular data helpers (extraction, target split)
//! - JSON persistence of fitted model state
//! - A CART decision tree regressor and an ordinary least squares regressor

pub mod data;
pub mod decision_tree;
pub mod linear_regression;
pub mod persistence;

use std::path::Path;
use thiserror::Error;

pub use data::{Matrix, parse_matrix};
pub use decision_tree::{DecisionTreeModel, TreeParams};
pub use linear_regression::LinearRegressionModel;

/// Errors raised by model lifecycle operations
#[derive(Debug, Error)]
pub enum ModelError {
    /// `predict`, `save_model` or `retrain` called before `train` or `load_model`
    #[error("Model is not trained. Train or load the model first.")]
    Untrained,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Lifecycle contract shared by every model
///
/// The stages run in a fixed order: `extract` -> `transform` -> `load` ->
/// `train` -> `predict`, with `save_model`/`load_model`/`retrain` operating
/// on the fitted state.
pub trait ModelInterface: Send {
    /// Stable identifier written into persisted model files
    fn kind(&self) -> &'static str;

    /// Whether `train` or `load_model` has established a fitted state
    fn is_trained(&self) -> bool;

    /// Read raw tabular data, either inline rows or a CSV file path
    fn extract(&self, raw: &str) -> ModelResult<Matrix> {
        data::extract(raw)
    }

    /// Split rows into features and target (last column)
    fn transform(&self, data: Matrix) -> ModelResult<(Matrix, Vec<f64>)> {
        data::split_target(data)
    }

    /// Hand the transformed data over for training
    fn load(&self, features: Matrix, target: Vec<f64>) -> ModelResult<(Matrix, Vec<f64>)> {
        data::check_training_set(&features, &target)?;
        Ok((features, target))
    }

    fn train(&mut self, features: &Matrix, target: &[f64]) -> ModelResult<()>;

    fn predict(&self, features: &Matrix) -> ModelResult<Vec<f64>>;

    fn save_model(&self, path: &Path) -> ModelResult<()>;

    fn load_model(&mut self, path: &Path) -> ModelResult<()>;

    /// Refit an already fitted model on new data
    fn retrain(&mut self, features: &Matrix, target: &[f64]) -> ModelResult<()>;
}
