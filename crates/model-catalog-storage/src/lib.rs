//! Storage layer for the model catalog
//!
//! This crate provides the object storage the catalog is layered on:
//! - The `ObjectStore` trait with its four primitives (push, pull, remove, list)
//! - A local file system implementation
//! - An in-memory implementation
//! - Explicit backend selection from configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use model_catalog_storage::{build_store, BackendConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = build_store(&BackendConfig::FileSystem {
//!     root: "/var/lib/model-catalog".into(),
//! });
//! store.validate().await?;
//! let objects = store.list_objects("model-catalog/domains").await?;
//! # Ok(())
//! # }
//! ```

// Re-export core domain types for convenience
pub use model_catalog_core;

pub mod backend;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod memory;

pub use backend::{validate_key, ObjectStore};
pub use config::{build_store, BackendConfig};
pub use error::{StorageError, StorageResult};
pub use filesystem::FileSystemStore;
pub use memory::MemoryStore;
