// ABOUTME: API error type and its HTTP mapping
// ABOUTME: Converts domain errors into status codes and a structured JSON error body

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use profilehub_core::ValidationError;
use profilehub_email::EmailError;
use profilehub_media::UploadError;
use profilehub_storage::StorageError;

/// Error type returned by every handler
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid or expired verification link")]
    InvalidVerificationLink,

    #[error("Resource not found")]
    NotFound,

    #[error("Request body too large")]
    RequestTooLarge,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound => ApiError::NotFound,
            StorageError::DuplicateEmail(_) | StorageError::DuplicateNickname(_) => {
                ApiError::Conflict(error.to_string())
            }
            other => ApiError::Storage(other),
        }
    }
}

/// Structured error response format for API consistency
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    request_id: String,
}

/// Error detail structure with machine-readable codes
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<HashMap<String, String>>,
}

impl ApiError {
    /// Convert ApiError to appropriate HTTP status code and error code
    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::InvalidVerificationLink => {
                (StatusCode::BAD_REQUEST, "INVALID_VERIFICATION_LINK")
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::RequestTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Upload(upload_error) => match upload_error {
                UploadError::UnsupportedMediaType { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_FILE_TYPE")
                }
                UploadError::PayloadTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
                }
                UploadError::UploadFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_FAILED")
                }
            },
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Email(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EMAIL_ERROR"),
        }
    }

    /// User-facing message; internal failures are not described in detail
    fn to_user_message(&self) -> String {
        match self {
            ApiError::Validation(err) => err.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::InvalidVerificationLink => self.to_string(),
            ApiError::NotFound => "The requested resource was not found".to_string(),
            ApiError::RequestTooLarge => self.to_string(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::Upload(UploadError::UploadFailed(_)) => {
                "Error uploading file".to_string()
            }
            ApiError::Upload(err) => err.to_string(),
            ApiError::Storage(_) => "Data storage error".to_string(),
            ApiError::Email(_) => "Failed to send email".to_string(),
        }
    }

    fn details(&self) -> Option<HashMap<String, String>> {
        match self {
            ApiError::Validation(err) => {
                let mut details = HashMap::new();
                if let Some(field) = err.field() {
                    details.insert("field".to_string(), field.to_string());
                }
                if let ValidationError::WeakPassword(problems) = root_cause(err) {
                    for (i, problem) in problems.iter().enumerate() {
                        details.insert(format!("password_{}", i + 1), problem.clone());
                    }
                }
                (!details.is_empty()).then_some(details)
            }
            ApiError::Upload(UploadError::PayloadTooLarge { limit, .. }) => Some(HashMap::from([(
                "max_bytes".to_string(),
                limit.to_string(),
            )])),
            _ => None,
        }
    }
}

fn root_cause(err: &ValidationError) -> &ValidationError {
    match err {
        ValidationError::Field { source, .. } => root_cause(source),
        other => other,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status_code, error_code) = self.to_status_and_code();

        if status_code.is_server_error() {
            error!(
                request_id = %request_id,
                error_code = %error_code,
                error = %self,
                "Internal server error occurred"
            );
        } else {
            info!(
                request_id = %request_id,
                error_code = %error_code,
                error = %self,
                "API error response"
            );
        }

        let error_response = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: error_code.to_string(),
                message: self.to_user_message(),
                details: self.details(),
            },
            request_id,
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
