//! Error types for storage operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Invalid store configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Schema bootstrap failed: {reason}")]
    SchemaBootstrap { reason: String },

    #[error("Operation {operation} requires bound parameters")]
    MissingParameters { operation: &'static str },

    #[error("Operation {operation} expects {expected} parameters, got {got}")]
    InvalidParameters {
        operation: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Duplicate key: a record with id {id} already exists")]
    DuplicateKey { id: String },

    #[error("Constraint violation during {operation}: {reason}")]
    Constraint {
        operation: &'static str,
        reason: String,
    },

    #[error("Database error during {operation}: {reason}")]
    Database {
        operation: &'static str,
        reason: String,
    },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::MissingParameters {
            operation: "select_by_id",
        };
        assert!(err.to_string().contains("select_by_id"));

        let err = StorageError::InvalidParameters {
            operation: "insert",
            expected: 5,
            got: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains('2'));

        let err = StorageError::DuplicateKey {
            id: "00000000-0000-0000-0000-000000000000".to_string(),
        };
        assert!(err.to_string().contains("already exists"));
    }
}
