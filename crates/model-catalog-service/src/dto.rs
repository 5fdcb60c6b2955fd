//! Data Transfer Objects (DTOs) for the service layer

use model_catalog_core::{DomainName, ModelId, ModelType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

// ============================================================================
// Upload DTOs
// ============================================================================

/// Request to register a packaged model archive in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Domain the model belongs to
    pub domain: DomainName,

    /// Identifier, unique within the domain
    pub model_id: ModelId,

    /// Local archive to push
    pub archive_path: PathBuf,

    /// Library and type of the model
    pub model_type: ModelType,

    /// Extra top-level fields copied into the metadata record
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl UploadRequest {
    pub fn new(
        domain: DomainName,
        model_id: ModelId,
        archive_path: impl Into<PathBuf>,
        model_type: ModelType,
    ) -> Self {
        Self {
            domain,
            model_id,
            archive_path: archive_path.into(),
            model_type,
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }
}
