//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests including
//! catalog setup over either backend and a store wrapper that injects
//! backend failures on chosen keys.

#![allow(dead_code)]

use async_trait::async_trait;
use model_catalog_core::{DomainName, MetadataRecord, ModelId, PathScheme, StateName, StorageBackend};
use model_catalog_service::{CatalogFacade, FileArtifact};
use model_catalog_storage::{FileSystemStore, MemoryStore, ObjectStore, StorageError, StorageResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub mod fixtures;

/// Key fragments on which each primitive fails
#[derive(Debug, Default)]
struct Faults {
    push: Vec<String>,
    pull: Vec<String>,
    remove: Vec<String>,
    list: Vec<String>,
}

fn matches_any(fragments: &[String], key: &str) -> bool {
    fragments.iter().any(|fragment| key.contains(fragment.as_str()))
}

/// Store wrapper that fails any primitive whose key contains a registered
/// fragment, as a transport error rather than "not found"
pub struct FaultyStore {
    inner: Arc<dyn ObjectStore>,
    faults: Mutex<Faults>,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
        }
    }

    pub fn inner(&self) -> &Arc<dyn ObjectStore> {
        &self.inner
    }

    pub fn fail_push(&self, fragment: &str) {
        self.faults.lock().unwrap().push.push(fragment.to_string());
    }

    pub fn fail_pull(&self, fragment: &str) {
        self.faults.lock().unwrap().pull.push(fragment.to_string());
    }

    pub fn fail_remove(&self, fragment: &str) {
        self.faults.lock().unwrap().remove.push(fragment.to_string());
    }

    pub fn fail_list(&self, fragment: &str) {
        self.faults.lock().unwrap().list.push(fragment.to_string());
    }

    pub fn heal(&self) {
        *self.faults.lock().unwrap() = Faults::default();
    }

    fn injected(&self, pick: fn(&Faults) -> &Vec<String>, key: &str) -> bool {
        let faults = self.faults.lock().unwrap();
        matches_any(pick(&faults), key)
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    fn backend(&self) -> StorageBackend {
        self.inner.backend()
    }

    async fn validate(&self) -> StorageResult<()> {
        self.inner.validate().await
    }

    async fn push(&self, source: &Path, key: &str) -> StorageResult<String> {
        if self.injected(|f| &f.push, key) {
            return Err(StorageError::Push {
                key: key.to_string(),
                message: "injected fault".to_string(),
            });
        }
        self.inner.push(source, key).await
    }

    async fn pull(&self, key: &str, dest_dir: &Path) -> StorageResult<PathBuf> {
        if self.injected(|f| &f.pull, key) {
            return Err(StorageError::Pull {
                key: key.to_string(),
                message: "injected fault".to_string(),
            });
        }
        self.inner.pull(key, dest_dir).await
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        if self.injected(|f| &f.remove, key) {
            return Err(StorageError::Remove {
                key: key.to_string(),
                message: "injected fault".to_string(),
            });
        }
        self.inner.remove(key).await
    }

    async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<Vec<u8>>> {
        if self.injected(|f| &f.list, prefix) {
            return Err(StorageError::List {
                prefix: prefix.to_string(),
                message: "injected fault".to_string(),
            });
        }
        self.inner.list_objects(prefix).await
    }
}

/// Catalog under test with its backing store and a scratch directory
pub struct TestCatalog {
    pub dir: TempDir,
    pub store: Arc<FaultyStore>,
    pub facade: CatalogFacade,
}

impl TestCatalog {
    /// Catalog over an in-memory store
    pub async fn in_memory() -> Self {
        Self::with_store(
            TempDir::new().unwrap(),
            Arc::new(MemoryStore::new("integration")),
            None,
        )
        .await
    }

    /// Catalog over a file system store inside the scratch directory
    pub async fn on_disk() -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileSystemStore::new(dir.path().join("store")));
        Self::with_store(dir, store, None).await
    }

    /// Second catalog sharing this one's store under another root prefix
    pub async fn sibling(&self, root_prefix: &str) -> CatalogFacade {
        CatalogFacade::new(self.store.clone(), PathScheme::new(Some(root_prefix)))
            .await
            .unwrap()
    }

    async fn with_store(
        dir: TempDir,
        inner: Arc<dyn ObjectStore>,
        root_prefix: Option<&str>,
    ) -> Self {
        let store = Arc::new(FaultyStore::new(inner));
        let facade = CatalogFacade::new(store.clone(), PathScheme::new(root_prefix))
            .await
            .unwrap();
        Self { dir, store, facade }
    }

    pub fn paths(&self) -> &PathScheme {
        self.facade.catalog().paths()
    }

    /// Upload a one-file model
    pub async fn upload(&self, domain: &str, model_id: &str) -> MetadataRecord {
        let artifact = fixtures::file_artifact(self.dir.path(), "files", model_id);
        self.facade
            .upload(domain, Some(model_id), &artifact, Default::default())
            .await
            .unwrap()
    }

    /// Upload several models in order, leaving their timestamps distinct
    pub async fn upload_all(&self, domain: &str, model_ids: &[&str]) -> Vec<MetadataRecord> {
        let mut records = Vec::new();
        for model_id in model_ids {
            records.push(self.upload(domain, model_id).await);
            tick().await;
        }
        records
    }

    /// Whether the underlying store holds `key`, bypassing injected faults
    pub async fn object_exists(&self, key: &str) -> bool {
        let scratch = TempDir::new().unwrap();
        self.store.inner().pull(key, scratch.path()).await.is_ok()
    }

    pub fn model_key(&self, domain: &str, model_id: &str, state: Option<&str>) -> String {
        let state = state.map(|s| StateName::parse(s).unwrap());
        self.paths()
            .model_key(&domain_name(domain), &model_id_of(model_id), state.as_ref())
    }

    pub fn artifact(&self, library: &str, name: &str) -> FileArtifact {
        fixtures::file_artifact(self.dir.path(), library, name)
    }
}

pub fn domain_name(name: &str) -> DomainName {
    DomainName::new(name).unwrap()
}

pub fn model_id_of(id: &str) -> ModelId {
    ModelId::new(id).unwrap()
}

pub fn ids(models: &[ModelId]) -> Vec<&str> {
    models.iter().map(|m| m.as_str()).collect()
}

/// Let the clock move so consecutive records get distinct timestamps
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(3)).await;
}
