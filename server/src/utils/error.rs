use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::backend::BackendError;
use crate::purchase::PurchaseFailure;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {message}")]
    ValidationError { field: &'static str, message: String },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Sold out: {0}")]
    SoldOut(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend error")]
    BackendError(#[from] BackendError),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AppError::ValidationError {
            field,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SoldOut(_) => StatusCode::CONFLICT,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BackendError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ExternalServiceError(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SoldOut(_) => "SOLD_OUT",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BackendError(_) | AppError::ExternalServiceError(_) => {
                "EXTERNAL_SERVICE_ERROR"
            }
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::ValidationError { field, .. } => Some(json!({ "field": field })),
            _ => None,
        }
    }

    // Client-side conditions are expected traffic; only service faults are errors.
    fn log(&self) {
        match self {
            AppError::ValidationError { message: msg, .. }
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::SoldOut(msg)
            | AppError::Conflict(msg) => {
                info!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::ExternalServiceError(msg) => {
                error!(error = ?self, message = %msg, "External service error");
            }
            AppError::BackendError(e) => {
                error!(error = ?e, "Backend error");
            }
        }
    }
}

impl From<PurchaseFailure> for AppError {
    fn from(failure: PurchaseFailure) -> Self {
        let message = failure.message().to_string();
        match failure {
            PurchaseFailure::NotAuthenticated => AppError::AuthError(message),
            PurchaseFailure::EventNotFound(_) => AppError::NotFound(message),
            PurchaseFailure::SoldOut(_) => AppError::SoldOut(message),
            PurchaseFailure::TransientServiceError(_) => AppError::ExternalServiceError(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError { message: msg, .. }
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::SoldOut(msg)
            | AppError::Conflict(msg)
            | AppError::ExternalServiceError(msg) => msg.clone(),
            AppError::BackendError(_) => {
                "The ticketing service is temporarily unavailable".to_string()
            }
        };

        error_response(code, public_message, self.details(), status)
    }
}
