//! Local file system backend
//!
//! Keys map onto paths below a root directory. Writes go to a temporary
//! sibling first and are renamed into place, so a concurrent reader sees
//! either the old object or the new one.

use async_trait::async_trait;
use model_catalog_core::StorageBackend;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, instrument};

use crate::backend::{file_name, validate_key, ObjectStore};
use crate::error::{StorageError, StorageResult};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Object store over a directory tree
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    /// Create a store rooted at `root`; the directory is created by
    /// [`ObjectStore::validate`] if missing
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    fn temp_path(target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        target.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), n))
    }
}

#[async_trait]
impl ObjectStore for FileSystemStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::FileSystem {
            base_path: self.root.to_string_lossy().into_owned(),
        }
    }

    async fn validate(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            StorageError::Configuration(format!(
                "cannot create root directory {}: {}",
                self.root.display(),
                e
            ))
        })?;
        let meta = fs::metadata(&self.root).await.map_err(|e| {
            StorageError::Configuration(format!("cannot read {}: {}", self.root.display(), e))
        })?;
        if !meta.is_dir() {
            return Err(StorageError::Configuration(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, source), fields(source = %source.display()))]
    async fn push(&self, source: &Path, key: &str) -> StorageResult<String> {
        let target = self.resolve(key)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::push(key, e))?;
        }

        let temp = Self::temp_path(&target);
        if let Err(e) = fs::copy(source, &temp).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::push(key, e));
        }
        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::push(key, e));
        }

        debug!("Pushed {}", key);
        Ok(key.to_string())
    }

    #[instrument(skip(self, dest_dir), fields(dest = %dest_dir.display()))]
    async fn pull(&self, key: &str, dest_dir: &Path) -> StorageResult<PathBuf> {
        let source = self.resolve(key)?;
        match fs::metadata(&source).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(StorageError::NotFound(key.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(StorageError::pull(key, e)),
        }

        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| StorageError::pull(key, e))?;
        let destination = dest_dir.join(file_name(key));
        fs::copy(&source, &destination).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::pull(key, e)
            }
        })?;

        debug!("Pulled {}", key);
        Ok(destination)
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> StorageResult<bool> {
        let target = self.resolve(key)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::remove(key, e)),
        }
    }

    #[instrument(skip(self))]
    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<Vec<u8>>> {
        let dir = self.resolve(prefix)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::list(prefix, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::list(prefix, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageError::list(prefix, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // In-flight writes are dot-prefixed temp files
            if !file_type.is_file() || name.starts_with('.') {
                continue;
            }
            files.push((name, entry.path()));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut objects = Vec::with_capacity(files.len());
        for (name, path) in files {
            match fs::read(&path).await {
                Ok(bytes) => objects.push(bytes),
                // Removed between listing and reading
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::list(&format!("{}/{}", prefix, name), e)),
            }
        }
        Ok(objects)
    }
}
