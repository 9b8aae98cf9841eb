use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::DataSanitizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    pub error_type: String,
    /// Stable machine-readable error code, when one is defined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
    /// Timestamp when the error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Response metadata for pagination, etc.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub page: i32,
    pub page_size: i32,
    pub total_pages: i32,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    /// No usable credential on the request
    #[error("Authentication required: {message}")]
    AuthRequired { message: String },

    /// Credential present but unusable (bad signature, expired, garbled)
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// Login with an unknown email or a wrong password. One variant for
    /// both so responses cannot be used to probe registered emails.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Authenticated but the role is not allowed on this route
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Authenticated but the target patient is not in the caller's clinic
    #[error("Access denied")]
    AccessDenied,

    #[error("Resource not found: {resource_type}")]
    NotFound { resource_type: String },

    #[error("Resource conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(#[from] database_layer::DatabaseError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] messaging_service::MessagingError),

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Create a validation error with field-specific errors
    pub fn validation_with_fields(
        message: impl Into<String>,
        field_errors: HashMap<String, Vec<String>>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Create a missing-credential error
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::AuthRequired {
            message: message.into(),
        }
    }

    /// Create an unusable-credential error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Create a role-rejection error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::AccessDenied => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Database(db_err) => match db_err {
                database_layer::DatabaseError::OwnershipViolation => StatusCode::FORBIDDEN,
                database_layer::DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
                database_layer::DatabaseError::Conflict(_) => StatusCode::CONFLICT,
                database_layer::DatabaseError::ConnectionFailed(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Messaging(msg_err) => match msg_err {
                messaging_service::MessagingError::NotFound => StatusCode::NOT_FOUND,
                messaging_service::MessagingError::AlreadyFinal(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::AuthRequired { .. } => "auth_required",
            ApiError::InvalidToken { .. } => "invalid_token",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Forbidden { .. } => "forbidden",
            ApiError::AccessDenied => "access_denied",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::Database(db_err) => match db_err {
                database_layer::DatabaseError::OwnershipViolation => "access_denied",
                database_layer::DatabaseError::NotFound { .. } => "not_found",
                database_layer::DatabaseError::Conflict(_) => "conflict",
                database_layer::DatabaseError::ConnectionFailed(_) => "service_unavailable",
                _ => "database_error",
            },
            ApiError::Messaging(msg_err) => match msg_err {
                messaging_service::MessagingError::NotFound => "not_found",
                messaging_service::MessagingError::AlreadyFinal(_) => "conflict",
                _ => "messaging_error",
            },
            ApiError::Internal { .. } => "internal_error",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::BadRequest { .. } => "bad_request",
        }
    }

    /// Stable error code for clients that key on codes rather than types
    pub fn error_code(&self) -> Option<&'static str> {
        use error_common::codes;

        match self {
            ApiError::Validation { .. } => Some(codes::validation::INVALID_INPUT),
            ApiError::AuthRequired { .. } => Some(codes::authentication::MISSING_TOKEN),
            ApiError::InvalidToken { .. } => Some(codes::authentication::INVALID_TOKEN),
            ApiError::InvalidCredentials => Some(codes::authentication::INVALID_CREDENTIALS),
            ApiError::Forbidden { .. } => Some(codes::authorization::ROLE_NOT_PERMITTED),
            ApiError::AccessDenied => Some(codes::authorization::OWNERSHIP_VIOLATION),
            ApiError::Database(database_layer::DatabaseError::OwnershipViolation) => {
                Some(codes::authorization::OWNERSHIP_VIOLATION)
            }
            ApiError::Database(database_layer::DatabaseError::ConnectionFailed(_)) => {
                Some(codes::database::CONNECTION_FAILED)
            }
            ApiError::Messaging(messaging_service::MessagingError::SendFailed(_)) => {
                Some(codes::scheduling::SEND_FAILED)
            }
            ApiError::Messaging(messaging_service::MessagingError::AlreadyFinal(_)) => {
                Some(codes::scheduling::ALREADY_FINAL)
            }
            _ => None,
        }
    }

    /// Client-facing message. Internal failure detail stays in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Database(db_err) => match db_err {
                database_layer::DatabaseError::OwnershipViolation => {
                    "Access denied: patient is not registered with your clinic".to_string()
                }
                database_layer::DatabaseError::NotFound { entity } => {
                    format!("{entity} not found")
                }
                database_layer::DatabaseError::Conflict(msg) => format!("Conflict: {msg}"),
                database_layer::DatabaseError::ConnectionFailed(_) => {
                    "Service temporarily unavailable".to_string()
                }
                _ => "An unexpected database error occurred".to_string(),
            },
            ApiError::Messaging(msg_err) => match msg_err {
                messaging_service::MessagingError::NotFound => "Message not found".to_string(),
                messaging_service::MessagingError::AlreadyFinal(state) => {
                    format!("Message is already {state}")
                }
                _ => "Message scheduling failed".to_string(),
            },
            ApiError::Internal { .. } => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log with full detail, scrubbed of contact data
        let sanitizer = DataSanitizer::new();
        error!(
            error_id = %error_id,
            error_type = %self.error_type(),
            status_code = %status_code.as_u16(),
            error = %sanitizer.sanitize_for_logging(&self.to_string()),
            "API error occurred"
        );

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            code: self.error_code().map(str::to_string),
            message: self.public_message(),
            field_errors,
            timestamp: chrono::Utc::now(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: None,
    }
}

/// Helper function to create successful API responses with metadata
pub fn api_success_with_meta<T>(data: T, metadata: ResponseMetadata) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: Some(metadata),
    }
}

/// Convert SQLx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(sqlx_error: sqlx::Error) -> Self {
        ApiError::Database(database_layer::DatabaseError::SqlxError(sqlx_error))
    }
}

/// Convert anyhow errors to API errors
impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal {
            message: error.to_string(),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use database_layer::DatabaseError;

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert_eq!(
            ApiError::auth_required("no header").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::invalid_token("bad signature").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_auth_error_types_are_distinct() {
        assert_eq!(ApiError::auth_required("x").error_type(), "auth_required");
        assert_eq!(ApiError::invalid_token("x").error_type(), "invalid_token");
        assert_eq!(
            ApiError::InvalidCredentials.error_type(),
            "invalid_credentials"
        );
    }

    #[test]
    fn test_role_rejection_is_forbidden() {
        let err = ApiError::forbidden("role INDIVIDUAL is not permitted");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_type(), "forbidden");
    }

    #[test]
    fn test_ownership_violation_maps_to_access_denied() {
        let err = ApiError::from(DatabaseError::OwnershipViolation);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_type(), "access_denied");
    }

    #[test]
    fn test_ownership_violation_does_not_leak_existence() {
        let err = ApiError::from(DatabaseError::OwnershipViolation);
        let msg = err.public_message();
        assert!(!msg.contains("exist"), "message must not hint at existence");
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let err = ApiError::from(DatabaseError::Conflict("email is already registered".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ApiError::internal("connection pool exhausted at 10.0.0.3");
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_gate_errors_carry_stable_codes() {
        assert_eq!(
            ApiError::auth_required("x").error_code(),
            Some(error_common::codes::authentication::MISSING_TOKEN)
        );
        assert_eq!(
            ApiError::from(DatabaseError::OwnershipViolation).error_code(),
            Some(error_common::codes::authorization::OWNERSHIP_VIOLATION)
        );
        assert_eq!(ApiError::internal("x").error_code(), None);
    }
}
