//! Storage-specific error types
//!
//! Backends must report a missing key as [`StorageError::NotFound`] and
//! nothing else: the catalog branches on it to tell "never existed" from
//! "deleted" from "could not be reached".

use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object exists at the key
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Reading an object failed for a reason other than absence
    #[error("Failed to pull {key}: {message}")]
    Pull { key: String, message: String },

    /// Writing an object failed
    #[error("Failed to push {key}: {message}")]
    Push { key: String, message: String },

    /// Removing an object failed
    #[error("Failed to remove {key}: {message}")]
    Remove { key: String, message: String },

    /// Listing a prefix failed
    #[error("Failed to list {prefix}: {message}")]
    List { prefix: String, message: String },

    /// Key is not usable by this backend
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Backend is misconfigured or unreachable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Domain error from core crate
    #[error("Domain error: {0}")]
    Domain(#[from] model_catalog_core::CatalogError),
}

impl StorageError {
    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    pub(crate) fn pull(key: &str, err: impl std::fmt::Display) -> Self {
        StorageError::Pull {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn push(key: &str, err: impl std::fmt::Display) -> Self {
        StorageError::Push {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn remove(key: &str, err: impl std::fmt::Display) -> Self {
        StorageError::Remove {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn list(prefix: &str, err: impl std::fmt::Display) -> Self {
        StorageError::List {
            prefix: prefix.to_string(),
            message: err.to_string(),
        }
    }
}
