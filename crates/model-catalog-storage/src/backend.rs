//! Object store trait abstraction
//!
//! This module defines the ObjectStore trait: the four primitives the
//! catalog builds everything else on. Implementations wrap a flat key space
//! (a directory tree, a bucket, a map) and give no guarantees across keys.

use async_trait::async_trait;
use model_catalog_core::{StorageBackend, StorageLocation};
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};

/// Flat object storage holding files under `/`-separated keys
///
/// Implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Identity of this backend, recorded in every storage location it issues
    fn backend(&self) -> StorageBackend;

    /// Check that the backend is configured and reachable
    ///
    /// # Returns
    /// * `Ok(())` - If the backend can be used
    /// * `Err(StorageError::Configuration)` - Otherwise
    async fn validate(&self) -> StorageResult<()>;

    /// Upload the file at `source` to `key`, replacing any existing object
    ///
    /// # Returns
    /// * `Ok(key)` - The key the object was written to
    async fn push(&self, source: &Path, key: &str) -> StorageResult<String>;

    /// Download the object at `key` into the directory `dest_dir`
    ///
    /// The local file is named after the last segment of the key.
    ///
    /// # Returns
    /// * `Ok(path)` - Path of the downloaded file
    /// * `Err(StorageError::NotFound)` - If no object exists at `key`
    /// * `Err(StorageError)` - For any other failure
    async fn pull(&self, key: &str, dest_dir: &Path) -> StorageResult<PathBuf>;

    /// Remove the object at `key`
    ///
    /// # Returns
    /// * `Ok(true)` - If an object was removed
    /// * `Ok(false)` - If there was nothing to remove
    async fn remove(&self, key: &str) -> StorageResult<bool>;

    /// Read every object directly under `prefix`
    ///
    /// Objects in nested "directories" are not included. The result is
    /// ordered by key; an empty or missing prefix yields an empty list.
    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<Vec<u8>>>;

    /// Build the storage location describing `key` on this backend
    fn location(&self, key: &str) -> StorageResult<StorageLocation> {
        Ok(StorageLocation::new(self.backend(), key)?)
    }

    /// Resolve a storage location issued by this backend back into a key
    ///
    /// # Returns
    /// * `Err(StorageError::Domain)` - If the location belongs to another backend
    fn key_for(&self, location: &StorageLocation) -> StorageResult<String> {
        Ok(location.key_for(&self.backend())?.to_string())
    }
}

/// Check that a key is a relative, `/`-separated path without `.`/`..`
/// or empty segments
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "'{}' must be a relative path without empty, '.' or '..' segments",
            key
        )));
    }
    Ok(())
}

/// Last segment of a key, used as the local file name on pull
pub(crate) fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
