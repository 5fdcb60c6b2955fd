//! Storage backend descriptors and archive locations
//!
//! A [`StorageLocation`] is recorded in every model's metadata so that the
//! archive can be found again. The catalog treats it as opaque apart from
//! one check: a location may only be resolved by the backend that wrote it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CatalogError, Result};

/// Identity of an object storage backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    /// Local filesystem storage
    FileSystem {
        /// Root directory all keys are resolved against
        base_path: String,
    },

    /// Process-local storage, gone when the process exits
    Memory {
        /// Name distinguishing separate in-memory stores
        name: String,
    },
}

impl StorageBackend {
    /// Validate the storage backend configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            StorageBackend::FileSystem { base_path } => {
                if base_path.is_empty() {
                    return Err(CatalogError::ValidationError(
                        "FileSystem base path cannot be empty".to_string(),
                    ));
                }
                Ok(())
            }
            StorageBackend::Memory { .. } => Ok(()),
        }
    }

    /// Get a human-readable name for the storage backend type
    pub fn backend_type(&self) -> &str {
        match self {
            StorageBackend::FileSystem { .. } => "FileSystem",
            StorageBackend::Memory { .. } => "Memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.backend_type())
    }
}

/// Where a model archive was stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    /// The backend that holds the archive
    pub backend: StorageBackend,
    /// The key of the archive within the backend
    pub path: String,
}

impl StorageLocation {
    /// Create a new storage location with validation
    ///
    /// # Errors
    /// Returns an error if the backend or path is invalid
    pub fn new(backend: StorageBackend, path: impl Into<String>) -> Result<Self> {
        backend.validate()?;

        let path = path.into();
        if path.is_empty() {
            return Err(CatalogError::ValidationError(
                "Storage path cannot be empty".to_string(),
            ));
        }

        Ok(Self { backend, path })
    }

    /// Return the archive key, provided this location belongs to `expected`
    ///
    /// # Errors
    /// Returns [`CatalogError::BackendMismatch`] when the location was
    /// written by a different backend (or a differently rooted one).
    pub fn key_for(&self, expected: &StorageBackend) -> Result<&str> {
        if &self.backend != expected {
            return Err(CatalogError::BackendMismatch {
                expected: describe(expected),
                actual: describe(&self.backend),
            });
        }
        Ok(&self.path)
    }

    /// URI representation of the location
    pub fn uri(&self) -> String {
        match &self.backend {
            StorageBackend::FileSystem { base_path } => {
                format!("file://{}/{}", base_path.trim_end_matches('/'), self.path)
            }
            StorageBackend::Memory { name } => {
                format!("memory://{}/{}", name, self.path)
            }
        }
    }
}

fn describe(backend: &StorageBackend) -> String {
    match backend {
        StorageBackend::FileSystem { base_path } => format!("file system at '{}'", base_path),
        StorageBackend::Memory { name } => format!("memory store '{}'", name),
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs_backend(path: &str) -> StorageBackend {
        StorageBackend::FileSystem {
            base_path: path.to_string(),
        }
    }

    #[test]
    fn test_backend_validation() {
        assert!(fs_backend("/data").validate().is_ok());
        let memory = StorageBackend::Memory {
            name: "scratch".to_string(),
        };
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_filesystem_backend_empty_path() {
        assert!(fs_backend("").validate().is_err());
    }

    #[test]
    fn test_storage_location_empty_path() {
        assert!(StorageLocation::new(fs_backend("/data"), "").is_err());
    }

    #[test]
    fn test_key_for_same_backend() {
        let location = StorageLocation::new(fs_backend("/data"), "a/b.tar.gz").unwrap();
        assert_eq!(location.key_for(&fs_backend("/data")).unwrap(), "a/b.tar.gz");
    }

    #[test]
    fn test_key_for_other_backend() {
        let location = StorageLocation::new(fs_backend("/data"), "a/b.tar.gz").unwrap();
        let err = location.key_for(&fs_backend("/elsewhere")).unwrap_err();
        assert!(matches!(err, CatalogError::BackendMismatch { .. }));

        let memory = StorageBackend::Memory {
            name: "models".to_string(),
        };
        match location.key_for(&memory).unwrap_err() {
            CatalogError::BackendMismatch { expected, actual } => {
                assert_eq!(expected, "memory store 'models'");
                assert_eq!(actual, "file system at '/data'");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_uri_generation() {
        let location = StorageLocation::new(
            StorageBackend::Memory {
                name: "scratch".to_string(),
            },
            "models/bert/artifacts.tar.gz",
        )
        .unwrap();
        assert_eq!(location.uri(), "memory://scratch/models/bert/artifacts.tar.gz");

        let location = StorageLocation::new(fs_backend("/var/lib/catalog/"), "m.tar.gz").unwrap();
        assert_eq!(location.uri(), "file:///var/lib/catalog/m.tar.gz");
    }

    #[test]
    fn test_location_serde_shape() {
        let location = StorageLocation::new(fs_backend("/data"), "k").unwrap();
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["backend"]["type"], "file_system");
        assert_eq!(json["backend"]["base_path"], "/data");
        assert_eq!(json["path"], "k");
    }
}
