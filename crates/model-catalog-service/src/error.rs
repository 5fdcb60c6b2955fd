//! Service-layer error types
//!
//! Every public catalog operation fails with exactly one of these kinds.
//! Storage errors are classified where the catalog knows what a missing
//! key means; the blanket conversion below never turns a backend failure
//! into a "not found" kind.

use model_catalog_core::CatalogError;
use model_catalog_storage::StorageError;
use thiserror::Error;

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Service-layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No domain-latest record exists for the name
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// No canonical metadata and no tombstone exist for the model
    #[error("Model not found: {domain}/{model_id}")]
    ModelNotFound { domain: String, model_id: String },

    /// The model existed and has been deleted
    #[error("Model has been deleted: {domain}/{model_id}")]
    ModelDeleted { domain: String, model_id: String },

    /// Upload of an id that already resolves to a live model
    #[error("Model already exists: {domain}/{model_id}")]
    ModelAlreadyExists { domain: String, model_id: String },

    /// A non-reserved state that was never created
    #[error("State not found: {0}")]
    StateNotFound(String),

    /// State name is malformed or collides with a reserved state
    #[error("Invalid state name: {0}")]
    InvalidStateName(String),

    /// Domain name or model id cannot be used
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading an object failed for a reason other than its absence
    #[error("Failed to pull {key}: {message}")]
    FilePullFailed { key: String, message: String },

    /// Storage location was written by a different backend
    #[error("Backend mismatch: {0}")]
    BackendMismatch(String),

    /// Any other backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Model metadata names a library the loader does not handle
    #[error("Unsupported library: model uses '{library}', loader handles '{loader}'")]
    UnsupportedLibrary { library: String, loader: String },

    /// Building or extracting an archive failed
    #[error("Packaging error: {0}")]
    Packaging(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Local I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// Internal service error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub(crate) fn model_not_found(domain: impl ToString, model_id: impl ToString) -> Self {
        ServiceError::ModelNotFound {
            domain: domain.to_string(),
            model_id: model_id.to_string(),
        }
    }

    pub(crate) fn model_deleted(domain: impl ToString, model_id: impl ToString) -> Self {
        ServiceError::ModelDeleted {
            domain: domain.to_string(),
            model_id: model_id.to_string(),
        }
    }

    /// Check if this error reports something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::DomainNotFound(_)
                | ServiceError::ModelNotFound { .. }
                | ServiceError::ModelDeleted { .. }
                | ServiceError::StateNotFound(_)
        )
    }
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidName(msg) => ServiceError::InvalidName(msg),
            CatalogError::InvalidStateName(msg) => ServiceError::InvalidStateName(msg),
            CatalogError::BackendMismatch { .. } => ServiceError::BackendMismatch(err.to_string()),
            CatalogError::ValidationError(msg) => ServiceError::Configuration(msg),
            CatalogError::SerializationError(msg) => ServiceError::Serialization(msg),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Pull { key, message } => ServiceError::FilePullFailed { key, message },
            StorageError::InvalidKey(msg) => ServiceError::InvalidName(msg),
            StorageError::Configuration(msg) => ServiceError::Configuration(msg),
            StorageError::Domain(err) => ServiceError::from(err),
            // A missing key that reaches this point was not expected to be
            // missing by the caller, so it is reported as a backend fault
            StorageError::NotFound(_)
            | StorageError::Push { .. }
            | StorageError::Remove { .. }
            | StorageError::List { .. } => ServiceError::Storage(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_failure_is_not_downgraded() {
        let err: ServiceError = StorageError::Pull {
            key: "k".to_string(),
            message: "timeout".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::FilePullFailed { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_unclassified_not_found_is_storage() {
        let err: ServiceError = StorageError::NotFound("k".to_string()).into();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn test_service_error_from_catalog_error() {
        let err: ServiceError = CatalogError::InvalidStateName("x".to_string()).into();
        assert!(matches!(err, ServiceError::InvalidStateName(_)));

        let err: ServiceError = StorageError::Domain(CatalogError::BackendMismatch {
            expected: "a".to_string(),
            actual: "b".to_string(),
        })
        .into();
        assert!(matches!(err, ServiceError::BackendMismatch(_)));
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::model_deleted("sales", "m1");
        assert_eq!(err.to_string(), "Model has been deleted: sales/m1");
        assert!(err.is_not_found());
    }
}
