//! Error types for widget records

use thiserror::Error;

/// Failures constructing, reconstructing or decoding a widget.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Name outside the allowed length range.
    #[error("Invalid name length {len}: must be between {min} and {max} characters")]
    InvalidName { len: usize, min: usize, max: usize },

    /// Timestamps out of order.
    #[error("updated_at {updated_at} precedes created_at {created_at}")]
    TimestampOrder {
        created_at: String,
        updated_at: String,
    },

    /// A stored or wire value could not be decoded.
    #[error("Malformed record field {field}: {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl RecordError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error came from decoding rather than from validation.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Result type alias for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_name_display() {
        let err = RecordError::InvalidName {
            len: 65,
            min: 1,
            max: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("65"));
        assert!(msg.contains("64"));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_malformed_display() {
        let err = RecordError::malformed("quantity", "not an integer");
        assert_eq!(
            err.to_string(),
            "Malformed record field quantity: not an integer"
        );
        assert!(err.is_malformed());
    }
}
