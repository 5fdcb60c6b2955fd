//! Records persisted by the catalog
//!
//! All three record kinds are stored as JSON objects. Listing operations
//! read them back in bulk and order them by their `created` field, since
//! backends do not agree on a listing order.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::storage::StorageLocation;
use crate::types::{DomainName, ModelId, StateName};

/// The ML library (and optionally the concrete type) a model was saved with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelType {
    /// Library name, used to pick a loader
    pub library: String,

    /// Library-specific type name
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ModelType {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            type_name: None,
        }
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

/// The `model` section of a metadata record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub domain: DomainName,
    pub model_id: ModelId,
    pub model_type: ModelType,

    /// Caller-supplied fields, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata document describing one uploaded model
///
/// Written once at the model's canonical key and copied verbatim to the
/// domain-latest slot and to every state the model is placed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub model: ModelInfo,
    pub storage: StorageLocation,
    pub created: DateTime<Utc>,

    /// Caller-supplied top-level fields, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetadataRecord {
    /// Assemble a record stamped with the current time
    pub fn new(
        domain: DomainName,
        model_id: ModelId,
        model_type: ModelType,
        storage: StorageLocation,
    ) -> Self {
        Self {
            model: ModelInfo {
                domain,
                model_id,
                model_type,
                extra: Map::new(),
            },
            storage,
            created: Utc::now(),
            extra: Map::new(),
        }
    }

    /// Attach extra top-level fields
    ///
    /// Keys that clash with the record's own fields are dropped.
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        for (key, value) in extra {
            if matches!(key.as_str(), "model" | "storage" | "created") {
                continue;
            }
            self.extra.insert(key, value);
        }
        self
    }

    pub fn domain(&self) -> &DomainName {
        &self.model.domain
    }

    pub fn model_id(&self) -> &ModelId {
        &self.model.model_id
    }

    pub fn library(&self) -> &str {
        &self.model.model_type.library
    }
}

/// Registry entry for a model state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub state_name: StateName,
    pub created: DateTime<Utc>,
}

impl StateRecord {
    pub fn new(state_name: StateName) -> Self {
        Self {
            state_name,
            created: Utc::now(),
        }
    }
}

/// Registry entry written when a domain receives its first model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: DomainName,
    pub created: DateTime<Utc>,
}

impl DomainRecord {
    pub fn new(domain: DomainName) -> Self {
        Self {
            domain,
            created: Utc::now(),
        }
    }
}

/// Records that carry a creation timestamp
pub trait Created {
    fn created(&self) -> DateTime<Utc>;
}

impl Created for MetadataRecord {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl Created for StateRecord {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl Created for DomainRecord {
    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// Sort records oldest first; ties keep their incoming order
pub fn sorted_by_created<T: Created>(mut records: Vec<T>) -> Vec<T> {
    records.sort_by_key(|r| r.created());
    records
}

/// Encode a record as the JSON bytes stored in the backend
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(record)?)
}

/// Decode a record read back from the backend
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}
