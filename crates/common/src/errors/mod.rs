//! Error types for PaperScope
//!
//! Provides a single domain error with:
//! - Distinct variants for validation, collaborator, storage and internal failures
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidUrl,
    PayloadTooLarge,
    DemoModeRestricted,

    // Resource errors (4xxx)
    PaperNotFound,

    // Storage errors (7xxx)
    StorageError,

    // External service errors (8xxx)
    UpstreamSearchError,
    GenerationError,
    GenerationCredentials,
    EmptyGeneration,
    DocumentUnavailable,
    DocumentParseError,
    EmbeddingError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidUrl => 1002,
            ErrorCode::PayloadTooLarge => 1003,
            ErrorCode::DemoModeRestricted => 1004,

            // Resources (4xxx)
            ErrorCode::PaperNotFound => 4001,

            // Storage (7xxx)
            ErrorCode::StorageError => 7001,

            // External (8xxx)
            ErrorCode::UpstreamSearchError => 8001,
            ErrorCode::GenerationError => 8002,
            ErrorCode::GenerationCredentials => 8003,
            ErrorCode::EmptyGeneration => 8004,
            ErrorCode::DocumentUnavailable => 8005,
            ErrorCode::DocumentParseError => 8006,
            ErrorCode::EmbeddingError => 8007,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Not a usable paper URL: {url}")]
    InvalidUrl { url: String },

    #[error("Payload exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Operation unavailable in demo mode: {operation}")]
    DemoModeRestricted { operation: String },

    // Resource errors
    #[error("Paper not found: {id}")]
    PaperNotFound { id: String },

    // Storage errors
    #[error("Storage error at {path}: {message}")]
    Storage { path: String, message: String },

    // External collaborator errors
    #[error("Paper search failed: {message}")]
    UpstreamSearch { message: String },

    #[error("Summary generation failed: {message}")]
    Generation { message: String },

    #[error("Summary generation rejected credentials: {message}")]
    GenerationCredentials { message: String },

    #[error("Summary generation returned no text")]
    EmptyGeneration,

    #[error("No document available: {message}")]
    DocumentUnavailable { message: String },

    #[error("Could not extract text from document: {message}")]
    DocumentParse { message: String },

    #[error("Embedding service error: {message}")]
    EmbeddingError { message: String },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Shorthand for a validation error without a field
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Storage error for a path
    pub fn storage(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        AppError::Storage {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::DemoModeRestricted { .. } => ErrorCode::DemoModeRestricted,
            AppError::PaperNotFound { .. } => ErrorCode::PaperNotFound,
            AppError::Storage { .. } => ErrorCode::StorageError,
            AppError::UpstreamSearch { .. } => ErrorCode::UpstreamSearchError,
            AppError::Generation { .. } => ErrorCode::GenerationError,
            AppError::GenerationCredentials { .. } => ErrorCode::GenerationCredentials,
            AppError::EmptyGeneration => ErrorCode::EmptyGeneration,
            AppError::DocumentUnavailable { .. } => ErrorCode::DocumentUnavailable,
            AppError::DocumentParse { .. } => ErrorCode::DocumentParseError,
            AppError::EmbeddingError { .. } => ErrorCode::EmbeddingError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } |
            AppError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,

            // 403 Forbidden
            AppError::DemoModeRestricted { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::PaperNotFound { .. } => StatusCode::NOT_FOUND,

            // 413 Payload Too Large
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 422 Unprocessable Entity
            AppError::DocumentParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            AppError::Storage { .. } |
            AppError::Internal { .. } |
            AppError::Configuration { .. } |
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::UpstreamSearch { .. } |
            AppError::Generation { .. } |
            AppError::GenerationCredentials { .. } |
            AppError::EmptyGeneration |
            AppError::DocumentUnavailable { .. } |
            AppError::EmbeddingError { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match &self {
            AppError::Validation { field, .. } => field.clone(),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("Background task failed: {}", err),
        }
    }
}
