//! Decision tree model package

use super::{ModelImplementation, ModelPlugin, PluginError, PluginExports};
use crate::models::{DecisionTreeModel, ModelInterface};
use crate::schema::{RequestSchema, ResponseSchema};

pub const PACKAGE_NAME: &str = "model-decision-tree";

pub struct DecisionTreePlugin;

fn create() -> Box<dyn ModelInterface> {
    Box::new(DecisionTreeModel::new())
}

impl ModelPlugin for DecisionTreePlugin {
    fn package_name(&self) -> &str {
        PACKAGE_NAME
    }

    fn load(&self) -> Result<PluginExports, PluginError> {
        Ok(PluginExports {
            request_schema: Some(
                RequestSchema::new("DecisionTreeRequest", "decision_tree")
                    .with_description("Input values for Decision Tree model"),
            ),
            response_schema: Some(
                ResponseSchema::new("DecisionTreeResponse")
                    .with_description("Prediction result data"),
            ),
            implementations: vec![ModelImplementation {
                class_name: "DecisionTreeModel",
                factory: create,
            }],
        })
    }
}
