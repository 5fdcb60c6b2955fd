//! Service layer for the model catalog
//!
//! This crate implements the catalog on top of an [`ObjectStore`]:
//!
//! - **StateRegistry**: creation and listing of model states
//! - **MetadataCatalog**: uploads, metadata reads, state membership and
//!   tombstone deletion
//! - **CatalogFacade**: name parsing, packaging and loading on top of the
//!   catalog
//!
//! # Example
//!
//! ```rust,no_run
//! use model_catalog_service::{CatalogConfig, CatalogFacade, FileArtifact, ServiceError};
//! use model_catalog_storage::BackendConfig;
//!
//! # async fn example() -> Result<(), ServiceError> {
//! let config = CatalogConfig::new(BackendConfig::FileSystem {
//!     root: "/var/lib/model-catalog".into(),
//! });
//! let catalog = CatalogFacade::from_config(&config).await?;
//!
//! let artifact = FileArtifact::new("onnx", vec!["model.onnx".into()]);
//! let record = catalog
//!     .upload("fraud", None, &artifact, Default::default())
//!     .await?;
//!
//! catalog.create_model_state("prod").await?;
//! catalog
//!     .set_model_state("fraud", record.model_id().as_str(), "prod")
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ObjectStore`]: model_catalog_storage::ObjectStore

pub mod adapters;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod dto;
pub mod error;
pub mod facade;
pub mod states;

mod objects;

pub use adapters::{FileArtifact, FileLoader, ModelArtifact, ModelLoader};
pub use archive::{create_archive, extract_archive, ARCHIVE_NAME};
pub use catalog::MetadataCatalog;
pub use config::CatalogConfig;
pub use dto::UploadRequest;
pub use error::{ServiceError, ServiceResult};
pub use facade::CatalogFacade;
pub use states::StateRegistry;
