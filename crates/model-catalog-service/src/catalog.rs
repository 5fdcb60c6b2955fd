//! Metadata catalog
//!
//! Everything the catalog knows lives in small JSON objects next to the
//! model archives: a canonical record per model, a copy per state the
//! model is in, a domain-latest slot and the domain and state registries.
//! Operations are sequences of backend calls with no cross-key atomicity,
//! so each one orders its writes to keep readers from seeing a model
//! vanish without a trace.

use model_catalog_core::{
    decode, sorted_by_created, DomainName, DomainRecord, MetadataRecord, ModelId, PathScheme,
    ReservedState, StateName,
};
use model_catalog_storage::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::dto::UploadRequest;
use crate::error::{ServiceError, ServiceResult};
use crate::objects::{list_json, probe, pull_bytes, push_json, scratch_dir};
use crate::states::StateRegistry;

/// Model metadata, state membership and deletion over an object store
#[derive(Clone)]
pub struct MetadataCatalog {
    store: Arc<dyn ObjectStore>,
    paths: PathScheme,
    states: StateRegistry,
}

impl MetadataCatalog {
    pub fn new(store: Arc<dyn ObjectStore>, paths: PathScheme) -> Self {
        let states = StateRegistry::new(store.clone(), paths.clone());
        Self {
            store,
            paths,
            states,
        }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn paths(&self) -> &PathScheme {
        &self.paths
    }

    pub fn states(&self) -> &StateRegistry {
        &self.states
    }

    // ========================================================================
    // Upload
    // ========================================================================

    /// Push an archive and record its metadata
    ///
    /// On failure after the archive push no metadata is visible and the
    /// upload can be retried.
    ///
    /// # Errors
    /// * `ModelAlreadyExists` - If the id resolves to a live model
    #[instrument(skip(self, request), fields(domain = %request.domain, model_id = %request.model_id))]
    pub async fn upload(&self, request: UploadRequest) -> ServiceResult<MetadataRecord> {
        let UploadRequest {
            domain,
            model_id,
            archive_path,
            model_type,
            extra,
        } = request;

        if self.model_exists(&domain, &model_id).await? {
            return Err(ServiceError::ModelAlreadyExists {
                domain: domain.to_string(),
                model_id: model_id.to_string(),
            });
        }

        let archive_key = self.paths.archive_key(&domain, &model_id, &archive_path)?;
        let pushed = self.store.push(&archive_path, &archive_key).await?;
        debug!("Pushed archive to {}", pushed);

        let record = MetadataRecord::new(
            domain.clone(),
            model_id.clone(),
            model_type,
            self.store.location(&pushed)?,
        )
        .with_extra(extra);

        let registered = self.register_domain(&domain).await?;
        if let Err(e) = self.write_metadata(&record).await {
            self.roll_back_upload(&record, registered).await;
            return Err(e);
        }

        info!("Model uploaded: {}/{}", domain, model_id);
        Ok(record)
    }

    async fn write_metadata(&self, record: &MetadataRecord) -> ServiceResult<()> {
        self.write_canonical(record).await?;
        self.write_latest(record).await
    }

    /// Remove what a failed upload managed to write
    ///
    /// The archive stays; a retry overwrites it under the same key.
    async fn roll_back_upload(&self, record: &MetadataRecord, registered_domain: bool) {
        let domain = record.domain();
        let canonical = self.paths.model_key(domain, record.model_id(), None);
        if let Err(e) = self.store.remove(&canonical).await {
            warn!("Failed to remove metadata of failed upload {}: {}", canonical, e);
        }
        if registered_domain {
            let key = self.paths.domain_key(domain);
            if let Err(e) = self.store.remove(&key).await {
                warn!("Failed to unregister domain {}: {}", domain, e);
            }
        }
    }

    /// Write the domain's registry entry unless it already has one
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn register_domain(&self, domain: &DomainName) -> ServiceResult<bool> {
        let key = self.paths.domain_key(domain);
        if probe(self.store.as_ref(), &key).await? {
            return Ok(false);
        }
        push_json(self.store.as_ref(), &key, &DomainRecord::new(domain.clone())).await?;
        info!("Registered domain: {}", domain);
        Ok(true)
    }

    async fn write_canonical(&self, record: &MetadataRecord) -> ServiceResult<()> {
        let key = self
            .paths
            .model_key(record.domain(), record.model_id(), None);
        push_json(self.store.as_ref(), &key, record).await
    }

    async fn write_latest(&self, record: &MetadataRecord) -> ServiceResult<()> {
        let key = self.paths.domain_latest_key(record.domain());
        push_json(self.store.as_ref(), &key, record).await
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Whether the id resolves to a live model
    ///
    /// Deleted models do not count as existing.
    pub async fn model_exists(&self, domain: &DomainName, model_id: &ModelId) -> ServiceResult<bool> {
        match self.get_metadata(domain, model_id).await {
            Ok(_) => Ok(true),
            Err(ServiceError::ModelNotFound { .. }) | Err(ServiceError::ModelDeleted { .. }) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Canonical metadata of a model
    ///
    /// # Errors
    /// * `ModelDeleted` - If only the tombstone remains
    /// * `ModelNotFound` - If the model never existed
    /// * `FilePullFailed` - If the backend could not be read
    #[instrument(skip(self), fields(domain = %domain, model_id = %model_id))]
    pub async fn get_metadata(
        &self,
        domain: &DomainName,
        model_id: &ModelId,
    ) -> ServiceResult<MetadataRecord> {
        let key = self.paths.model_key(domain, model_id, None);
        match pull_bytes(self.store.as_ref(), &key).await {
            Ok(bytes) => Ok(decode(&bytes)?),
            Err(e) if e.is_not_found() => Err(self.missing_model(domain, model_id).await),
            Err(e) => Err(e.into()),
        }
    }

    /// Explain why a model's canonical record is absent
    async fn missing_model(&self, domain: &DomainName, model_id: &ModelId) -> ServiceError {
        let deleted: StateName = ReservedState::Deleted.into();
        let tombstone = self.paths.model_key(domain, model_id, Some(&deleted));
        match probe(self.store.as_ref(), &tombstone).await {
            Ok(true) => ServiceError::model_deleted(domain, model_id),
            Ok(false) => ServiceError::model_not_found(domain, model_id),
            Err(e) => e,
        }
    }

    /// Domains in registration order
    #[instrument(skip(self))]
    pub async fn list_domains(&self) -> ServiceResult<Vec<DomainName>> {
        let records: Vec<DomainRecord> =
            list_json(self.store.as_ref(), &self.paths.domains_prefix()).await?;
        Ok(sorted_by_created(records)
            .into_iter()
            .map(|record| record.domain)
            .collect())
    }

    /// Metadata of the latest model uploaded to a domain
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn get_domain(&self, domain: &DomainName) -> ServiceResult<MetadataRecord> {
        let key = self.paths.domain_latest_key(domain);
        match pull_bytes(self.store.as_ref(), &key).await {
            Ok(bytes) => Ok(decode(&bytes)?),
            Err(e) if e.is_not_found() => Err(ServiceError::DomainNotFound(domain.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Model ids in a domain, oldest first, optionally restricted to a state
    ///
    /// # Errors
    /// * `StateNotFound` - If `state` has never been created
    /// * `DomainNotFound` - If nothing was uploaded to the domain
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn list_models(
        &self,
        domain: &DomainName,
        state: Option<&StateName>,
    ) -> ServiceResult<Vec<ModelId>> {
        if let Some(state) = state {
            if !self.states.state_exists(state).await? {
                return Err(ServiceError::StateNotFound(state.to_string()));
            }
        }
        self.get_domain(domain).await?;

        let records: Vec<MetadataRecord> = list_json(
            self.store.as_ref(),
            &self.paths.models_prefix(domain, state),
        )
        .await?;
        Ok(sorted_by_created(records)
            .into_iter()
            .map(|record| record.model.model_id)
            .collect())
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Replace a live model's metadata
    ///
    /// The domain-latest slot is rewritten when it holds this model, and
    /// every state copy the model has is refreshed.
    #[instrument(skip(self, record), fields(domain = %domain, model_id = %model_id))]
    pub async fn set_metadata(
        &self,
        domain: &DomainName,
        model_id: &ModelId,
        record: &MetadataRecord,
    ) -> ServiceResult<()> {
        if record.domain() != domain || record.model_id() != model_id {
            return Err(ServiceError::InvalidInput(format!(
                "record describes {}/{}, not {}/{}",
                record.domain(),
                record.model_id(),
                domain,
                model_id
            )));
        }
        self.get_metadata(domain, model_id).await?;
        self.write_canonical(record).await?;

        match self.get_domain(domain).await {
            Ok(latest) if latest.model_id() == model_id => self.write_latest(record).await?,
            Ok(_) | Err(ServiceError::DomainNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        for state in self.states.list_user_states().await? {
            let key = self.paths.model_key(domain, model_id, Some(&state));
            if probe(self.store.as_ref(), &key).await? {
                push_json(self.store.as_ref(), &key, record).await?;
                debug!("Refreshed copy in state {}", state);
            }
        }

        info!("Metadata updated: {}/{}", domain, model_id);
        Ok(())
    }

    /// Place a model in a state
    ///
    /// Reserved states are created on first use; user states must exist.
    /// Repeating the call rewrites identical bytes.
    #[instrument(skip(self), fields(domain = %domain, model_id = %model_id, state = %state))]
    pub async fn set_model_state(
        &self,
        domain: &DomainName,
        model_id: &ModelId,
        state: &StateName,
    ) -> ServiceResult<()> {
        if state.is_reserved() {
            self.states.ensure_state(state).await?;
        } else if !self.states.state_exists(state).await? {
            return Err(ServiceError::StateNotFound(state.to_string()));
        }

        let canonical = self.paths.model_key(domain, model_id, None);
        let scratch = scratch_dir()?;
        let local = match self.store.pull(&canonical, scratch.path()).await {
            Ok(path) => path,
            Err(e) if e.is_not_found() => return Err(self.missing_model(domain, model_id).await),
            Err(e) => return Err(e.into()),
        };

        let key = self.paths.model_key(domain, model_id, Some(state));
        self.store.push(&local, &key).await?;
        info!("Model {}/{} placed in state {}", domain, model_id, state);
        Ok(())
    }

    /// Take a model out of a state
    ///
    /// Reserved memberships are permanent, so unsetting one does nothing.
    /// Removing a membership the model never had is not an error.
    #[instrument(skip(self), fields(domain = %domain, model_id = %model_id, state = %state))]
    pub async fn unset_model_state(
        &self,
        domain: &DomainName,
        model_id: &ModelId,
        state: &StateName,
    ) -> ServiceResult<()> {
        if state.is_reserved() {
            debug!("Ignoring unset of reserved state");
            return Ok(());
        }
        if !self.states.state_exists(state).await? {
            return Err(ServiceError::StateNotFound(state.to_string()));
        }

        let key = self.paths.model_key(domain, model_id, Some(state));
        if self.store.remove(&key).await? {
            info!("Model {}/{} removed from state {}", domain, model_id, state);
        } else {
            debug!("Model was not in state");
        }
        Ok(())
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete a model, leaving a tombstone
    ///
    /// Steps run in order: archive removal, best-effort removal from every
    /// user state, tombstone write, canonical record removal. The tombstone
    /// is written before the canonical record goes so a concurrent reader
    /// sees either the record or the tombstone. If the model was the
    /// domain's latest, the slot then moves to the newest remaining model.
    #[instrument(skip(self, metadata), fields(domain = %domain, model_id = %model_id))]
    pub async fn delete_model(
        &self,
        domain: &DomainName,
        model_id: &ModelId,
        metadata: &MetadataRecord,
    ) -> ServiceResult<()> {
        if metadata.domain() != domain || metadata.model_id() != model_id {
            return Err(ServiceError::InvalidInput(format!(
                "metadata describes {}/{}, not {}/{}",
                metadata.domain(),
                metadata.model_id(),
                domain,
                model_id
            )));
        }

        let archive_key = self.store.key_for(&metadata.storage)?;
        if !self.store.remove(&archive_key).await? {
            warn!("Archive {} was already gone", archive_key);
        }

        match self.states.list_user_states().await {
            Ok(states) => {
                for state in states {
                    if let Err(e) = self.unset_model_state(domain, model_id, &state).await {
                        warn!("Failed to remove {}/{} from state {}: {}", domain, model_id, state, e);
                    }
                }
            }
            Err(e) => warn!("Failed to list states while deleting {}/{}: {}", domain, model_id, e),
        }

        self.set_model_state(domain, model_id, &ReservedState::Deleted.into())
            .await?;

        let canonical = self.paths.model_key(domain, model_id, None);
        self.store.remove(&canonical).await?;
        info!("Model deleted: {}/{}", domain, model_id);

        if let Err(e) = self.repoint_latest(domain, model_id).await {
            warn!("Failed to update latest model of {}: {}", domain, e);
        }
        Ok(())
    }

    /// Move the domain-latest slot off a deleted model
    async fn repoint_latest(&self, domain: &DomainName, deleted: &ModelId) -> ServiceResult<()> {
        let latest = match self.get_domain(domain).await {
            Ok(latest) => latest,
            Err(ServiceError::DomainNotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };
        if latest.model_id() != deleted {
            return Ok(());
        }

        let remaining: Vec<MetadataRecord> = list_json(
            self.store.as_ref(),
            &self.paths.models_prefix(domain, None),
        )
        .await?;
        match sorted_by_created(remaining).pop() {
            Some(newest) => {
                self.write_latest(&newest).await?;
                debug!("Latest model of {} is now {}", domain, newest.model_id());
            }
            None => debug!("No models remain in {}", domain),
        }
        Ok(())
    }

    // ========================================================================
    // Archives
    // ========================================================================

    /// Pull a model's archive into `dest_dir`
    ///
    /// Without a model id the domain's latest model is used.
    #[instrument(skip(self, dest_dir), fields(domain = %domain))]
    pub async fn download_archive(
        &self,
        domain: &DomainName,
        model_id: Option<&ModelId>,
        dest_dir: &Path,
    ) -> ServiceResult<PathBuf> {
        let model_id = match model_id {
            Some(id) => id.clone(),
            None => self.get_domain(domain).await?.model.model_id,
        };
        let metadata = self.get_metadata(domain, &model_id).await?;
        let key = self.store.key_for(&metadata.storage)?;

        match self.store.pull(&key, dest_dir).await {
            Ok(path) => {
                debug!("Downloaded archive of {}/{}", domain, model_id);
                Ok(path)
            }
            Err(e) if e.is_not_found() => Err(ServiceError::FilePullFailed {
                key,
                message: "archive is missing although the model's metadata exists".to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
