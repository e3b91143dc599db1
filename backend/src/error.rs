//! Error handling for the Solar Performance Monitor
//!
//! One taxonomy shared by the collector, the CLI, and the HTTP surface.
//! Collaborator outages and bad measurements are recoverable per
//! installation; store errors are fatal for the operation that hit them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// A collaborator (metering or weather API) could not deliver data.
    /// The affected installation is skipped and retried on the next run.
    #[error("{service} unavailable: {detail}")]
    SourceUnavailable { service: String, detail: String },

    /// A measurement or parameter violated the evaluator's contract
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No configured recipient accepted the notification
    #[error("Notification delivery failed: {0}")]
    DeliveryFailure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<shared::performance::PerformanceError> for AppError {
    fn from(err: shared::performance::PerformanceError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::SourceUnavailable { service, detail } => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "SOURCE_UNAVAILABLE".to_string(),
                    message: format!("{} unavailable: {}", service, detail),
                },
            ),
            AppError::InvalidInput(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_INPUT".to_string(),
                    message: msg.clone(),
                },
            ),
            AppError::DeliveryFailure(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "DELIVERY_FAILURE".to_string(),
                    message: format!("Notification delivery failed: {}", msg),
                },
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message: format!("Configuration error: {}", msg),
                },
            ),
            AppError::Database(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "STORE_UNAVAILABLE".to_string(),
                    message: "The record store is unavailable".to_string(),
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
