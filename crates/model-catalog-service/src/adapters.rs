//! Model adapters
//!
//! The catalog never inspects model files itself. An artifact knows how to
//! write a model out to files; a loader knows how to read those files back
//! for one library. Loaders are passed to the facade explicitly.

use model_catalog_core::{MetadataRecord, ModelType};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{ServiceError, ServiceResult};

/// Something that can be saved as model files
pub trait ModelArtifact: Send + Sync {
    /// Library and type recorded in the model's metadata
    fn model_type(&self) -> ModelType;

    /// Write the model's files into `dir` and return their paths
    fn save(&self, dir: &Path) -> ServiceResult<Vec<PathBuf>>;
}

/// Reads model files produced by one library
pub trait ModelLoader: Send + Sync {
    type Model;

    /// Library this loader handles, compared with `model.model_type.library`
    fn library(&self) -> &str;

    /// Build the model from files extracted into `dir`
    ///
    /// `dir` is removed once this returns, so the model must not keep
    /// references into it.
    fn load(&self, dir: &Path, metadata: &MetadataRecord) -> ServiceResult<Self::Model>;
}

/// Plain files uploaded as-is under a caller-chosen library name
#[derive(Debug, Clone)]
pub struct FileArtifact {
    model_type: ModelType,
    files: Vec<PathBuf>,
}

impl FileArtifact {
    pub fn new(library: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            model_type: ModelType::new(library),
            files,
        }
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.model_type = self.model_type.with_type_name(type_name);
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl ModelArtifact for FileArtifact {
    fn model_type(&self) -> ModelType {
        self.model_type.clone()
    }

    fn save(&self, dir: &Path) -> ServiceResult<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut saved = Vec::with_capacity(self.files.len());
        for file in &self.files {
            if !file.is_file() {
                return Err(ServiceError::InvalidInput(format!(
                    "{} is not a file",
                    file.display()
                )));
            }
            let name = file.file_name().ok_or_else(|| {
                ServiceError::InvalidInput(format!("{} has no file name", file.display()))
            })?;
            if !seen.insert(name.to_os_string()) {
                return Err(ServiceError::InvalidInput(format!(
                    "more than one file is named {}",
                    name.to_string_lossy()
                )));
            }
            let target = dir.join(name);
            std::fs::copy(file, &target)?;
            saved.push(target);
        }
        Ok(saved)
    }
}

/// Loader that reads the extracted files into memory, keyed by file name
#[derive(Debug, Clone)]
pub struct FileLoader {
    library: String,
}

impl FileLoader {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
        }
    }
}

impl ModelLoader for FileLoader {
    type Model = BTreeMap<String, Vec<u8>>;

    fn library(&self) -> &str {
        &self.library
    }

    fn load(&self, dir: &Path, _metadata: &MetadataRecord) -> ServiceResult<Self::Model> {
        let mut files = BTreeMap::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let name = entry.file_name().to_string_lossy().into_owned();
                files.insert(name, std::fs::read(entry.path())?);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_artifact_copies_files() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let weights = src.path().join("weights.bin");
        std::fs::write(&weights, b"w").unwrap();

        let artifact = FileArtifact::new("files", vec![weights]).with_type_name("bundle");
        let saved = artifact.save(dest.path()).unwrap();
        assert_eq!(saved, vec![dest.path().join("weights.bin")]);
        assert_eq!(artifact.model_type().type_name.as_deref(), Some("bundle"));
    }

    #[test]
    fn test_file_artifact_rejects_missing_file() {
        let dest = TempDir::new().unwrap();
        let artifact = FileArtifact::new("files", vec![dest.path().join("absent")]);
        assert!(matches!(
            artifact.save(dest.path()),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
