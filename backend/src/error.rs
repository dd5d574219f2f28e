//! Error handling for the Item Weight Measure form host
//!
//! Every error is rendered as `{"error": {"code", "message", "field"?}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::FormError;
use thiserror::Error;

use crate::external::FetchError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Report cycle errors
    #[error("A report is already being generated")]
    GenerationInProgress,

    #[error("Report generation was superseded by a newer request")]
    GenerationSuperseded,

    // External service errors
    #[error("Report fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::GenerationInProgress => AppError::GenerationInProgress,
            FormError::StaleCycle(_) => AppError::GenerationSuperseded,
            FormError::RowNotFound { table, index } => {
                AppError::NotFound(format!("Row {} of {}", index, table))
            }
            FormError::Query(query) => AppError::Validation {
                field: query.field().to_string(),
                message: query.to_string(),
            },
        }
    }
}

impl AppError {
    /// HTTP status and stable error code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::GenerationInProgress => (StatusCode::CONFLICT, "GENERATION_IN_PROGRESS"),
            AppError::GenerationSuperseded => (StatusCode::CONFLICT, "GENERATION_SUPERSEDED"),
            AppError::Fetch(FetchError::Network(_)) => (StatusCode::BAD_GATEWAY, "ERP_UNREACHABLE"),
            AppError::Fetch(FetchError::Validation(_)) => (StatusCode::BAD_REQUEST, "ERP_VALIDATION_ERROR"),
            AppError::Fetch(FetchError::Server { .. }) => (StatusCode::BAD_GATEWAY, "ERP_SERVER_ERROR"),
            AppError::Fetch(FetchError::Decode(_)) => (StatusCode::BAD_GATEWAY, "ERP_RESPONSE_INVALID"),
            AppError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let error_detail = match &self {
            AppError::Validation { field, message } => ErrorDetail {
                code: code.to_string(),
                message: message.clone(),
                field: Some(field.clone()),
            },
            AppError::Fetch(FetchError::Validation(message)) => ErrorDetail {
                code: code.to_string(),
                message: message.clone(),
                field: None,
            },
            AppError::NotFound(resource) => ErrorDetail {
                code: code.to_string(),
                message: format!("{} not found", resource),
                field: None,
            },
            AppError::Internal(_) => ErrorDetail {
                code: code.to_string(),
                message: "An internal server error occurred".to_string(),
                field: None,
            },
            other => ErrorDetail {
                code: code.to_string(),
                message: other.to_string(),
                field: None,
            },
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
