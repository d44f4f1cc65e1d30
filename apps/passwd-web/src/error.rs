//! Application error types and HTTP response handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use passwd_orchestrator::OrchestratorError;
use passwd_quality::QualityError;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the web front-end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Quality policy error: {0}")]
    Quality(#[from] QualityError),

    #[error("Backend setup error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structured error response returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Get the error code string for the response.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Quality(_) => "QUALITY_POLICY_ERROR",
            AppError::Orchestrator(_) => "BACKEND_SETUP_ERROR",
            AppError::BadRequest { .. } => "BAD_REQUEST",
            AppError::Io(_) => "IO_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        // Startup errors never reach clients, but keep internals out regardless.
        let message = match self {
            AppError::BadRequest { .. } => self.to_string(),
            _ => "Internal server error".to_string(),
        };
        ErrorResponse {
            error: self.error_code().to_string(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}

/// Result type alias for application operations.
pub type AppResult<T> = Result<T, AppError>;
