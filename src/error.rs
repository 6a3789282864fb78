//! Error types for API responses

use crate::registry::DispatchError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    /// Request did not validate against the registered schemas
    Validation(String),
    /// Server-side failure with a detail safe to show to clients
    Dispatch(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Dispatch(msg) => {
                tracing::error!(detail = %msg, "Dispatch error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse {
            detail,
            timestamp: chrono::Utc::now(),
        });

        (status, body).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NoMatchingSchema { .. } => ApiError::Validation(err.to_string()),
            DispatchError::AmbiguousSchema { .. } | DispatchError::MissingResponseSchema { .. } => {
                ApiError::Dispatch(err.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    timestamp: chrono::DateTime<chrono::Utc>,
}
