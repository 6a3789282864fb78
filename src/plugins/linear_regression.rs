//! Linear regression model package

use super::{ModelImplementation, ModelPlugin, PluginError, PluginExports};
use crate::models::{LinearRegressionModel, ModelInterface};
use crate::schema::{RequestSchema, ResponseSchema};

pub const PACKAGE_NAME: &str = "model-linear-regression";

pub struct LinearRegressionPlugin;

fn create() -> Box<dyn ModelInterface> {
    Box::new(LinearRegressionModel::new())
}

impl ModelPlugin for LinearRegressionPlugin {
    fn package_name(&self) -> &str {
        PACKAGE_NAME
    }

    fn load(&self) -> Result<PluginExports, PluginError> {
        Ok(PluginExports {
            request_schema: Some(
                RequestSchema::new("LinearRegressionRequest", "linear_regression")
                    .with_description("Input values for Linear Regression model"),
            ),
            response_schema: Some(
                ResponseSchema::new("LinearRegressionResponse")
                    .with_description("Prediction result data"),
            ),
            implementations: vec![ModelImplementation {
                class_name: "LinearRegressionModel",
                factory: create,
            }],
        })
    }
}
