//! In-process backend
//!
//! Objects live in an ordered map for the lifetime of the store. Useful for
//! tests and for throwaway catalogs; it still moves real files on push and
//! pull so callers exercise the same code paths as with a disk or bucket.

use async_trait::async_trait;
use model_catalog_core::StorageBackend;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::backend::{file_name, validate_key, ObjectStore};
use crate::error::{StorageError, StorageResult};

/// Object store backed by a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    name: String,
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// All keys currently stored, in order
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Raw bytes stored at `key`
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory {
            name: self.name.clone(),
        }
    }

    async fn validate(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn push(&self, source: &Path, key: &str) -> StorageResult<String> {
        validate_key(key)?;
        let bytes = fs::read(source)
            .await
            .map_err(|e| StorageError::push(key, e))?;
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(key.to_string())
    }

    async fn pull(&self, key: &str, dest_dir: &Path) -> StorageResult<PathBuf> {
        validate_key(key)?;
        let bytes = self
            .get(key)
            .await
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| StorageError::pull(key, e))?;
        let destination = dest_dir.join(file_name(key));
        fs::write(&destination, bytes)
            .await
            .map_err(|e| StorageError::pull(key, e))?;
        Ok(destination)
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        Ok(self.objects.write().await.remove(key).is_some())
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<Vec<u8>>> {
        validate_key(prefix)?;
        let dir = format!("{}/", prefix);
        let objects = self.objects.read().await;
        Ok(objects
            .range(dir.clone()..)
            .take_while(|(key, _)| key.starts_with(&dir))
            .filter(|(key, _)| !key[dir.len()..].contains('/'))
            .map(|(_, bytes)| bytes.clone())
            .collect())
    }
}
