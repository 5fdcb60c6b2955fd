//! Test fixtures
//!
//! This module provides model files and artifacts for integration tests.

use model_catalog_service::FileArtifact;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Write a model's files into a fresh directory under `root`
///
/// The weights file holds the model name so downloads can be told apart.
pub fn write_model_files(root: &Path, name: &str) -> Vec<PathBuf> {
    let dir = root.join("fixtures").join(name);
    std::fs::create_dir_all(&dir).unwrap();

    let weights = dir.join("weights.bin");
    std::fs::write(&weights, format!("weights of {}", name)).unwrap();
    let config = dir.join("config.json");
    std::fs::write(&config, json!({ "name": name, "layers": 4 }).to_string()).unwrap();

    vec![weights, config]
}

/// A file artifact for `name` under `library`
pub fn file_artifact(root: &Path, library: &str, name: &str) -> FileArtifact {
    FileArtifact::new(library, write_model_files(root, name))
}

/// Extra metadata fields as attached by a training pipeline
pub fn training_extra(accuracy: f64) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("metrics".to_string(), json!({ "accuracy": accuracy }));
    extra.insert("owner".to_string(), json!("risk-team"));
    extra
}
