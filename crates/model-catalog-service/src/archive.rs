//! Model archive packaging
//!
//! A model is stored as one gzip-compressed tarball holding its files at
//! the top level.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// File name of every packaged archive
pub const ARCHIVE_NAME: &str = "artifacts.tar.gz";

/// Pack `files` into `dest_dir/ARCHIVE_NAME`
///
/// # Errors
/// * `Packaging` - If two files share a name or a file cannot be read
pub async fn create_archive(files: Vec<PathBuf>, dest_dir: PathBuf) -> ServiceResult<PathBuf> {
    tokio::task::spawn_blocking(move || pack(&files, &dest_dir))
        .await
        .map_err(|e| ServiceError::Internal(format!("archive task failed: {}", e)))?
}

/// Unpack an archive into `dest_dir`
pub async fn extract_archive(archive: PathBuf, dest_dir: PathBuf) -> ServiceResult<()> {
    tokio::task::spawn_blocking(move || unpack(&archive, &dest_dir))
        .await
        .map_err(|e| ServiceError::Internal(format!("archive task failed: {}", e)))?
}

fn pack(files: &[PathBuf], dest_dir: &Path) -> ServiceResult<PathBuf> {
    if files.is_empty() {
        return Err(ServiceError::Packaging("no files to package".to_string()));
    }

    let mut names = HashSet::new();
    for file in files {
        let name = file
            .file_name()
            .ok_or_else(|| {
                ServiceError::Packaging(format!("{} has no file name", file.display()))
            })?;
        if !names.insert(name.to_os_string()) {
            return Err(ServiceError::Packaging(format!(
                "more than one file is named {}",
                name.to_string_lossy()
            )));
        }
    }

    std::fs::create_dir_all(dest_dir)?;
    let archive_path = dest_dir.join(ARCHIVE_NAME);
    let output = File::create(&archive_path)?;
    let mut builder = tar::Builder::new(GzEncoder::new(output, Compression::default()));

    for file in files {
        // Names were checked above
        let name = file.file_name().unwrap_or_default();
        builder.append_path_with_name(file, name).map_err(|e| {
            ServiceError::Packaging(format!("failed to add {}: {}", file.display(), e))
        })?;
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| ServiceError::Packaging(format!("failed to finish archive: {}", e)))?;

    debug!("Packed {} files into {}", files.len(), archive_path.display());
    Ok(archive_path)
}

fn unpack(archive_path: &Path, dest_dir: &Path) -> ServiceResult<()> {
    let file = File::open(archive_path).map_err(|e| {
        ServiceError::Packaging(format!("failed to open {}: {}", archive_path.display(), e))
    })?;

    std::fs::create_dir_all(dest_dir)?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    archive
        .unpack(dest_dir)
        .map_err(|e| ServiceError::Packaging(format!("failed to extract archive: {}", e)))?;

    debug!("Extracted {} into {}", archive_path.display(), dest_dir.display());
    Ok(())
}
