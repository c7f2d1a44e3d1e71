//! Error Types for the Widget API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//! - Conversions from record and storage errors
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use widget_core::RecordError;
use widget_storage::StorageError;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Field format is incorrect
    InvalidFormat,

    /// Both `id` and `name` were supplied to a read
    AmbiguousQuery,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested widget does not exist
    WidgetNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// A widget with the same id already exists
    DuplicateKey,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// A stored row could not be decoded into a widget
    MalformedRecord,

    /// The widget table could not be created
    SchemaBootstrapFailed,

    /// Database operation failed
    DatabaseError,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat
            | ErrorCode::AmbiguousQuery => StatusCode::BAD_REQUEST,

            ErrorCode::WidgetNotFound => StatusCode::NOT_FOUND,

            ErrorCode::DuplicateKey => StatusCode::CONFLICT,

            ErrorCode::MalformedRecord
            | ErrorCode::SchemaBootstrapFailed
            | ErrorCode::DatabaseError
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::AmbiguousQuery => "Supply either id or name, not both",
            ErrorCode::WidgetNotFound => "Widget not found",
            ErrorCode::DuplicateKey => "Widget already exists",
            ErrorCode::MalformedRecord => "Stored widget record is malformed",
            ErrorCode::SchemaBootstrapFailed => "Widget storage could not be initialized",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    pub fn ambiguous_query() -> Self {
        Self::from_code(ErrorCode::AmbiguousQuery)
    }

    pub fn widget_not_found(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::WidgetNotFound,
            format!("Widget {} not found", id),
        )
    }

    pub fn duplicate_key(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::DuplicateKey,
            format!("Widget with id {} already exists", id),
        )
    }

    pub fn malformed_record(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedRecord, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Lets handlers return `ApiError` directly:
/// ```ignore
/// async fn handler() -> Result<Json<WidgetsResponse>, ApiError> {
///     Err(ApiError::widget_not_found(id))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM LOWER LAYERS
// ============================================================================

/// Convert from a record validation or decoding error.
///
/// Validation failures are the client's fault. A malformed record can only
/// come from storage, so it is a server fault.
impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Malformed { .. } => {
                tracing::error!(error = %err, "Malformed widget record");
                ApiError::malformed_record(err.to_string())
            }
            other => ApiError::validation_failed(other.to_string()),
        }
    }
}

/// Convert from a storage engine error.
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateKey { id } => ApiError::duplicate_key(id),
            StorageError::MissingParameters { operation } => ApiError::new(
                ErrorCode::MissingField,
                format!("Operation '{}' requires parameters", operation),
            ),
            StorageError::InvalidParameters { .. } => ApiError::invalid_input(err.to_string()),
            StorageError::Constraint { .. } => {
                tracing::warn!(error = %err, "Storage constraint rejected the record");
                ApiError::validation_failed("Record violates a storage constraint")
            }
            StorageError::SchemaBootstrap { .. } => {
                tracing::error!(error = %err, "Schema bootstrap failed");
                ApiError::from_code(ErrorCode::SchemaBootstrapFailed)
            }
            StorageError::InvalidConfig { .. } => {
                tracing::error!(error = %err, "Invalid storage configuration");
                ApiError::from_code(ErrorCode::InternalError)
            }
            StorageError::Database { .. } => {
                // Full detail goes to the log only
                tracing::error!(error = %err, "Database error");
                ApiError::from_code(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Convert from a failed blocking task.
impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!("Storage task failed: {:?}", err);
        ApiError::internal_error("Storage task failed")
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidFormat.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::AmbiguousQuery.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::WidgetNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::DuplicateKey.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::MalformedRecord.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::SchemaBootstrapFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::DatabaseError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::widget_not_found("abc");
        assert_eq!(err.code, ErrorCode::WidgetNotFound);
        assert!(err.message.contains("abc"));

        let err = ApiError::missing_field("parts");
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("parts"));

        let err = ApiError::invalid_format("id", "UUID");
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(err.message.contains("UUID"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::duplicate_key("00000000-0000-0000-0000-000000000000");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("DUPLICATE_KEY"));
        assert!(!json.contains("details"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_storage_duplicate_key_is_conflict() {
        let err: ApiError = StorageError::DuplicateKey {
            id: "x".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_database_error_hides_detail() {
        let err: ApiError = StorageError::Database {
            operation: "insert",
            reason: "disk I/O error at /secret/path".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("/secret/path"));
    }

    #[test]
    fn test_storage_bootstrap_failure() {
        let err: ApiError = StorageError::SchemaBootstrap {
            reason: "readonly database".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::SchemaBootstrapFailed);
    }

    #[test]
    fn test_record_errors_split_client_and_server() {
        let err: ApiError = RecordError::InvalidName {
            len: 65,
            min: 1,
            max: 64,
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err: ApiError = RecordError::malformed("created_at", "not a timestamp").into();
        assert_eq!(err.code, ErrorCode::MalformedRecord);
    }
}
