//! JSON object helpers over the store primitives
//!
//! The store only moves files, so every read goes through a scratch
//! directory that is removed when the call returns.

use model_catalog_core::{decode, encode};
use model_catalog_storage::{ObjectStore, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::TempDir;
use tracing::warn;

use crate::error::ServiceResult;

pub(crate) fn scratch_dir() -> ServiceResult<TempDir> {
    Ok(tempfile::Builder::new().prefix("model-catalog-").tempdir()?)
}

fn object_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Serialize `record` and store it at `key`
pub(crate) async fn push_json<T: Serialize>(
    store: &dyn ObjectStore,
    key: &str,
    record: &T,
) -> ServiceResult<()> {
    let scratch = scratch_dir()?;
    let path = scratch.path().join(object_name(key));
    tokio::fs::write(&path, encode(record)?).await?;
    store.push(&path, key).await?;
    Ok(())
}

/// Raw bytes of the object at `key`
///
/// Storage errors are returned untouched so the caller can decide what a
/// missing key means.
pub(crate) async fn pull_bytes(store: &dyn ObjectStore, key: &str) -> StorageResult<Vec<u8>> {
    let scratch = scratch_dir().map_err(|e| StorageError::Pull {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    let path = store.pull(key, scratch.path()).await?;
    tokio::fs::read(&path).await.map_err(|e| StorageError::Pull {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Whether an object exists at `key`
///
/// Only a missing key counts as absent; any other failure is an error.
pub(crate) async fn probe(store: &dyn ObjectStore, key: &str) -> ServiceResult<bool> {
    match pull_bytes(store, key).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Decode every record directly under `prefix`
///
/// Objects that are not records of the expected shape are skipped.
pub(crate) async fn list_json<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    prefix: &str,
) -> ServiceResult<Vec<T>> {
    let objects = store.list_objects(prefix).await?;
    let mut records = Vec::with_capacity(objects.len());
    for bytes in objects {
        match decode::<T>(&bytes) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping unreadable object under {}: {}", prefix, e),
        }
    }
    Ok(records)
}
