//! Catalog configuration

use model_catalog_core::PathScheme;
use model_catalog_storage::BackendConfig;
use serde::{Deserialize, Serialize};

/// Settings that select where a catalog lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Optional prefix placed before every catalog key
    #[serde(default)]
    pub root_prefix: Option<String>,

    /// Object store holding the catalog
    #[serde(default)]
    pub backend: BackendConfig,
}

impl CatalogConfig {
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            root_prefix: None,
            backend,
        }
    }

    pub fn with_root_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.root_prefix = Some(prefix.into());
        self
    }

    /// Key layout for this configuration
    pub fn paths(&self) -> PathScheme {
        PathScheme::new(self.root_prefix.as_deref())
    }
}
