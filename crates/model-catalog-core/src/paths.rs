//! Key derivation for everything the catalog stores
//!
//! Layout under an optional root prefix `R`:
//!
//! ```text
//! R/model-catalog/domains/<domain>.json                         domain registry
//! R/model-catalog/models/<domain>/latest.json                   domain latest
//! R/model-catalog/models/<domain>/versions/<model>.json         canonical metadata
//! R/model-catalog/models/<domain>/versions/<state>/<model>.json state membership
//! R/model-catalog/models/<domain>/artifacts/<model>/<file>      archives
//! R/model-catalog/model_states/<state>.json                     state registry
//! ```
//!
//! Every function is pure. A state-scoped key always extends the unscoped
//! models prefix, so membership of a state is a single prefix listing.

use std::path::Path;

use crate::error::{CatalogError, Result};
use crate::types::{DomainName, ModelId, StateName};

/// Directory all catalog keys live under
pub const CATALOG_DIR: &str = "model-catalog";

const DOMAINS_DIR: &str = "domains";
const MODELS_DIR: &str = "models";
const STATES_DIR: &str = "model_states";
const VERSIONS_DIR: &str = "versions";
const ARTIFACTS_DIR: &str = "artifacts";
const LATEST_FILE: &str = "latest.json";

/// Derives object keys from domain, model and state names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathScheme {
    root: String,
}

impl PathScheme {
    /// Create a scheme rooted at `root_prefix` (tenant isolation)
    ///
    /// Leading and trailing slashes are ignored; an empty prefix is the
    /// same as none.
    pub fn new(root_prefix: Option<&str>) -> Self {
        let root = root_prefix
            .map(|p| p.trim_matches('/').to_string())
            .unwrap_or_default();
        Self { root }
    }

    pub fn root_prefix(&self) -> &str {
        &self.root
    }

    fn join(&self, parts: &[&str]) -> String {
        let mut key = String::new();
        if !self.root.is_empty() {
            key.push_str(&self.root);
            key.push('/');
        }
        key.push_str(CATALOG_DIR);
        for part in parts {
            key.push('/');
            key.push_str(part);
        }
        key
    }

    /// Prefix holding one registry entry per domain
    pub fn domains_prefix(&self) -> String {
        self.join(&[DOMAINS_DIR])
    }

    /// Registry entry for a domain
    pub fn domain_key(&self, domain: &DomainName) -> String {
        self.join(&[DOMAINS_DIR, &json_file(domain.as_str())])
    }

    /// Slot holding the metadata of the latest model uploaded to a domain
    pub fn domain_latest_key(&self, domain: &DomainName) -> String {
        self.join(&[MODELS_DIR, domain.as_str(), LATEST_FILE])
    }

    /// Prefix holding the metadata of a domain's models, optionally
    /// restricted to the members of a state
    pub fn models_prefix(&self, domain: &DomainName, state: Option<&StateName>) -> String {
        match state {
            Some(state) => self.join(&[MODELS_DIR, domain.as_str(), VERSIONS_DIR, state.as_str()]),
            None => self.join(&[MODELS_DIR, domain.as_str(), VERSIONS_DIR]),
        }
    }

    /// Metadata key of a model, or of its copy inside a state
    pub fn model_key(
        &self,
        domain: &DomainName,
        model_id: &ModelId,
        state: Option<&StateName>,
    ) -> String {
        format!(
            "{}/{}",
            self.models_prefix(domain, state),
            json_file(model_id.as_str())
        )
    }

    /// Prefix holding one registry entry per state
    pub fn states_prefix(&self) -> String {
        self.join(&[STATES_DIR])
    }

    /// Registry entry for a state
    pub fn state_key(&self, state: &StateName) -> String {
        self.join(&[STATES_DIR, &json_file(state.as_str())])
    }

    /// Key for a model archive packaged at `local_path`
    ///
    /// The model id makes the key unique within the domain.
    pub fn archive_key(
        &self,
        domain: &DomainName,
        model_id: &ModelId,
        local_path: &Path,
    ) -> Result<String> {
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CatalogError::InvalidName(format!(
                    "archive path '{}' has no usable file name",
                    local_path.display()
                ))
            })?;
        Ok(self.join(&[
            MODELS_DIR,
            domain.as_str(),
            ARTIFACTS_DIR,
            model_id.as_str(),
            file_name,
        ]))
    }
}

fn json_file(name: &str) -> String {
    format!("{}.json", name)
}
