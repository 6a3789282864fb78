//! API request handlers

use super::models::{HealthResponse, ModelsResponse};
use super::routes::AppState;
use crate::error::ApiError;
use crate::registry::ModelDescriptor;
use crate::schema::{PredictRequest, PredictResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// GET /health - Service health check
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            registered_models: state.registry.len(),
            timestamp: chrono::Utc::now(),
        }),
    )
}

/// GET /metrics - Prometheus metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// GET /openapi.json - OpenAPI document built from the registered schemas
pub async fn openapi(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(super::openapi::document(&state.registry))
}

/// GET /models - List registered model descriptors
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.registry.descriptors().cloned().collect(),
        discovery: state.registry.report().clone(),
    })
}

/// GET /models/{name} - Get one descriptor by normalized name
pub async fn get_model(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ModelDescriptor>, ApiError> {
    state
        .registry
        .get(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Model '{}' is not registered", name)))
}

/// POST /predict - Validate a request and answer with the matching response schema
///
/// No inference happens: the response echoes the validated request.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let (descriptor, response_schema) = state.registry.resolve(&request).inspect_err(|e| {
        if matches!(e, crate::registry::DispatchError::NoMatchingSchema { .. }) {
            crate::metrics::record_validation_failure();
        }
        tracing::warn!(model_name = %request.model_name, error = %e, "Prediction request rejected");
    })?;

    tracing::info!(
        model = %descriptor.name,
        values = request.values.len(),
        "Successfully validated request"
    );
    crate::metrics::record_prediction(&descriptor.name);

    Ok(Json(response_schema.respond(&request)))
}
