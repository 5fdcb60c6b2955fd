//! Error types for the model catalog core

use thiserror::Error;

/// Result type alias for core catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while building or decoding catalog values
///
/// These never involve I/O; backend failures live in the storage layer.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A domain name or model id that cannot be turned into a key
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// A state name that is empty, malformed, or reserved
    #[error("Invalid state name: {0}")]
    InvalidStateName(String),

    /// Storage location does not belong to the backend reading it
    #[error("Storage location belongs to {actual}, expected {expected}")]
    BackendMismatch { expected: String, actual: String },

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::BackendMismatch {
            expected: "FileSystem".to_string(),
            actual: "Memory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Storage location belongs to Memory, expected FileSystem"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CatalogError = err.into();
        assert!(matches!(err, CatalogError::SerializationError(_)));
    }
}
