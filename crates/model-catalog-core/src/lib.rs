//! Core types for the model catalog
//!
//! This crate holds the pure part of the catalog: validated names, the
//! records persisted for models, states and domains, storage location
//! descriptors, and the scheme that maps all of them onto object keys.
//! Nothing here performs I/O.

pub mod error;
pub mod metadata;
pub mod paths;
pub mod storage;
pub mod types;

// Re-exports for convenience
pub use error::{CatalogError, Result};
pub use metadata::{
    decode, encode, sorted_by_created, Created, DomainRecord, MetadataRecord, ModelInfo,
    ModelType, StateRecord,
};
pub use paths::PathScheme;
pub use storage::{StorageBackend, StorageLocation};
pub use types::{DomainName, ModelId, ReservedState, StateName};
