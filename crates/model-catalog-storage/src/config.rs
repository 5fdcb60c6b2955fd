//! Backend selection
//!
//! The set of backends is closed and chosen explicitly by configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::ObjectStore;
use crate::filesystem::FileSystemStore;
use crate::memory::MemoryStore;

/// Which object store the catalog runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Directory tree on local disk
    FileSystem {
        /// Root directory
        root: PathBuf,
    },

    /// In-process map, discarded on exit
    Memory {
        #[serde(default = "default_memory_name")]
        name: String,
    },
}

fn default_memory_name() -> String {
    "default".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::FileSystem {
            root: PathBuf::from("model-store"),
        }
    }
}

/// Instantiate the configured backend
pub fn build_store(config: &BackendConfig) -> Arc<dyn ObjectStore> {
    match config {
        BackendConfig::FileSystem { root } => Arc::new(FileSystemStore::new(root.clone())),
        BackendConfig::Memory { name } => Arc::new(MemoryStore::new(name.clone())),
    }
}
