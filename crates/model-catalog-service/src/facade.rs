//! Catalog facade
//!
//! String-in, record-out entry point used by the CLI and by applications.
//! Names are parsed here, so an unusable domain, model id or state name
//! fails before any backend call is made.

use model_catalog_core::{DomainName, MetadataRecord, ModelId, PathScheme, StateName};
use model_catalog_storage::{build_store, ObjectStore};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::adapters::{ModelArtifact, ModelLoader};
use crate::archive::{create_archive, extract_archive};
use crate::catalog::MetadataCatalog;
use crate::config::CatalogConfig;
use crate::dto::UploadRequest;
use crate::error::{ServiceError, ServiceResult};
use crate::objects::scratch_dir;

/// High-level model catalog operations
#[derive(Clone)]
pub struct CatalogFacade {
    catalog: MetadataCatalog,
}

impl CatalogFacade {
    /// Create a facade over `store`, checking the backend is usable
    pub async fn new(store: Arc<dyn ObjectStore>, paths: PathScheme) -> ServiceResult<Self> {
        store.validate().await?;
        debug!("Using {} backend", store.backend().backend_type());
        Ok(Self {
            catalog: MetadataCatalog::new(store, paths),
        })
    }

    /// Create a facade for the configured backend and root prefix
    pub async fn from_config(config: &CatalogConfig) -> ServiceResult<Self> {
        Self::new(build_store(&config.backend), config.paths()).await
    }

    pub fn catalog(&self) -> &MetadataCatalog {
        &self.catalog
    }

    async fn resolve_model_id(
        &self,
        domain: &DomainName,
        model_id: Option<&str>,
    ) -> ServiceResult<ModelId> {
        match model_id {
            Some(id) => Ok(ModelId::new(id)?),
            None => Ok(self.catalog.get_domain(domain).await?.model.model_id),
        }
    }

    // ========================================================================
    // Domains and models
    // ========================================================================

    pub async fn list_domains(&self) -> ServiceResult<Vec<DomainName>> {
        self.catalog.list_domains().await
    }

    /// Metadata of the latest model in a domain
    pub async fn get_domain(&self, domain: &str) -> ServiceResult<MetadataRecord> {
        self.catalog.get_domain(&DomainName::new(domain)?).await
    }

    pub async fn list_models(
        &self,
        domain: &str,
        state: Option<&str>,
    ) -> ServiceResult<Vec<ModelId>> {
        let domain = DomainName::new(domain)?;
        let state = state.map(StateName::parse).transpose()?;
        self.catalog.list_models(&domain, state.as_ref()).await
    }

    pub async fn get_model_info(&self, domain: &str, model_id: &str) -> ServiceResult<MetadataRecord> {
        self.catalog
            .get_metadata(&DomainName::new(domain)?, &ModelId::new(model_id)?)
            .await
    }

    /// Replace a model's metadata, keeping its state copies in step
    pub async fn set_model_info(
        &self,
        domain: &str,
        model_id: &str,
        record: &MetadataRecord,
    ) -> ServiceResult<()> {
        self.catalog
            .set_metadata(&DomainName::new(domain)?, &ModelId::new(model_id)?, record)
            .await
    }

    pub async fn model_exists(&self, domain: &str, model_id: &str) -> ServiceResult<bool> {
        self.catalog
            .model_exists(&DomainName::new(domain)?, &ModelId::new(model_id)?)
            .await
    }

    // ========================================================================
    // Artifacts
    // ========================================================================

    /// Package an artifact and upload it
    ///
    /// A model id is generated when none is given.
    #[instrument(skip(self, artifact, extra), fields(domain = %domain))]
    pub async fn upload(
        &self,
        domain: &str,
        model_id: Option<&str>,
        artifact: &dyn ModelArtifact,
        extra: Map<String, Value>,
    ) -> ServiceResult<MetadataRecord> {
        let domain = DomainName::new(domain)?;
        let model_id = match model_id {
            Some(id) => ModelId::new(id)?,
            None => ModelId::generate(),
        };

        let scratch = scratch_dir()?;
        let staging = scratch.path().join("files");
        tokio::fs::create_dir_all(&staging).await?;
        let files = artifact.save(&staging)?;
        let archive = create_archive(files, scratch.path().join("archive")).await?;

        let request = UploadRequest::new(domain, model_id, archive, artifact.model_type())
            .with_extra(extra);
        self.catalog.upload(request).await
    }

    /// Download a model's files into `local_dir`
    ///
    /// Without a model id the domain's latest model is used.
    #[instrument(skip(self, local_dir), fields(domain = %domain))]
    pub async fn download(
        &self,
        local_dir: &Path,
        domain: &str,
        model_id: Option<&str>,
    ) -> ServiceResult<PathBuf> {
        let domain = DomainName::new(domain)?;
        let model_id = self.resolve_model_id(&domain, model_id).await?;

        let scratch = scratch_dir()?;
        let archive = self
            .catalog
            .download_archive(&domain, Some(&model_id), scratch.path())
            .await?;
        extract_archive(archive, local_dir.to_path_buf()).await?;

        info!("Downloaded {}/{} to {}", domain, model_id, local_dir.display());
        Ok(local_dir.to_path_buf())
    }

    /// Download a model and build it with `loader`
    ///
    /// # Errors
    /// * `UnsupportedLibrary` - If the model was saved by another library
    #[instrument(skip(self, loader), fields(domain = %domain, library = %loader.library()))]
    pub async fn load<L: ModelLoader>(
        &self,
        loader: &L,
        domain: &str,
        model_id: Option<&str>,
    ) -> ServiceResult<L::Model> {
        let domain = DomainName::new(domain)?;
        let model_id = self.resolve_model_id(&domain, model_id).await?;
        let metadata = self.catalog.get_metadata(&domain, &model_id).await?;
        if metadata.library() != loader.library() {
            return Err(ServiceError::UnsupportedLibrary {
                library: metadata.library().to_string(),
                loader: loader.library().to_string(),
            });
        }

        let scratch = scratch_dir()?;
        let archive = self
            .catalog
            .download_archive(&domain, Some(&model_id), &scratch.path().join("archive"))
            .await?;
        let files = scratch.path().join("files");
        extract_archive(archive, files.clone()).await?;
        loader.load(&files, &metadata)
    }

    // ========================================================================
    // States
    // ========================================================================

    pub async fn create_model_state(&self, name: &str) -> ServiceResult<StateName> {
        self.catalog.states().create_state(name).await
    }

    pub async fn list_model_states(&self) -> ServiceResult<Vec<StateName>> {
        self.catalog.states().list_user_states().await
    }

    pub async fn set_model_state(&self, domain: &str, model_id: &str, state: &str) -> ServiceResult<()> {
        self.catalog
            .set_model_state(
                &DomainName::new(domain)?,
                &ModelId::new(model_id)?,
                &StateName::parse(state)?,
            )
            .await
    }

    pub async fn remove_model_state(
        &self,
        domain: &str,
        model_id: &str,
        state: &str,
    ) -> ServiceResult<()> {
        self.catalog
            .unset_model_state(
                &DomainName::new(domain)?,
                &ModelId::new(model_id)?,
                &StateName::parse(state)?,
            )
            .await
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete a model, leaving a tombstone behind
    pub async fn delete_model(&self, domain: &str, model_id: &str) -> ServiceResult<()> {
        let domain = DomainName::new(domain)?;
        let model_id = ModelId::new(model_id)?;
        let metadata = self.catalog.get_metadata(&domain, &model_id).await?;
        self.catalog.delete_model(&domain, &model_id, &metadata).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FileArtifact, FileLoader};
    use model_catalog_storage::MemoryStore;
    use tempfile::TempDir;

    async fn facade() -> CatalogFacade {
        CatalogFacade::new(Arc::new(MemoryStore::new("facade")), PathScheme::new(None))
            .await
            .unwrap()
    }

    fn artifact(dir: &TempDir) -> FileArtifact {
        let weights = dir.path().join("weights.bin");
        std::fs::write(&weights, b"weights").unwrap();
        FileArtifact::new("files", vec![weights])
    }

    #[tokio::test]
    async fn test_upload_generates_model_id() {
        let dir = TempDir::new().unwrap();
        let facade = facade().await;
        let record = facade
            .upload("sales", None, &artifact(&dir), Map::new())
            .await
            .unwrap();
        assert_eq!(record.model_id().as_str().len(), 26);
        assert!(facade
            .model_exists("sales", record.model_id().as_str())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_download_extracts_files() {
        let dir = TempDir::new().unwrap();
        let facade = facade().await;
        facade
            .upload("sales", Some("m1"), &artifact(&dir), Map::new())
            .await
            .unwrap();

        let out = dir.path().join("out");
        let path = facade.download(&out, "sales", None).await.unwrap();
        assert_eq!(path, out);
        assert_eq!(std::fs::read(out.join("weights.bin")).unwrap(), b"weights");
        assert!(!out.join(crate::archive::ARCHIVE_NAME).exists());
    }

    #[tokio::test]
    async fn test_load_checks_library() {
        let dir = TempDir::new().unwrap();
        let facade = facade().await;
        facade
            .upload("sales", Some("m1"), &artifact(&dir), Map::new())
            .await
            .unwrap();

        let files = facade
            .load(&FileLoader::new("files"), "sales", Some("m1"))
            .await
            .unwrap();
        assert_eq!(files.get("weights.bin").map(Vec::as_slice), Some(&b"weights"[..]));

        let err = facade
            .load(&FileLoader::new("onnx"), "sales", Some("m1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnsupportedLibrary { .. }));
    }

    #[tokio::test]
    async fn test_names_are_checked_before_backend_calls() {
        let facade = facade().await;
        assert!(matches!(
            facade.get_domain("a/b").await,
            Err(ServiceError::InvalidName(_))
        ));
        assert!(matches!(
            facade.list_models("sales", Some("not valid")).await,
            Err(ServiceError::InvalidStateName(_))
        ));
    }
}
