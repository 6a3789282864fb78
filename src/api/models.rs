//! API request and response models

use crate::registry::{DiscoveryReport, ModelDescriptor};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub registered_models: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Registered model listing
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelDescriptor>,
    pub discovery: DiscoveryReport,
}
