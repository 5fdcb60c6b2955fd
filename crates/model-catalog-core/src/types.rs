//! Core type definitions
//!
//! Names in this module end up as path segments in object keys, so every
//! constructor validates that the value cannot escape or collide with the
//! segment it is placed in.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use ulid::Ulid;

use crate::error::{CatalogError, Result};

fn validate_segment(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CatalogError::InvalidName(format!("{} cannot be empty", kind)));
    }
    if value == "." || value == ".." {
        return Err(CatalogError::InvalidName(format!(
            "{} cannot be '{}'",
            kind, value
        )));
    }
    if value
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(CatalogError::InvalidName(format!(
            "{} '{}' contains a path separator or whitespace",
            kind, value
        )));
    }
    Ok(())
}

/// Name of a domain: a namespace grouping models that serve one end use
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Create a validated domain name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_segment("Domain name", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DomainName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

/// Identifier of one model version within a domain
///
/// Either supplied by the caller or generated as a ULID, which keeps
/// generated ids lexicographically sortable by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId(String);

impl ModelId {
    /// Create a validated model id
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_segment("Model id", &id)?;
        Ok(Self(id))
    }

    /// Generate a fresh unique model id
    pub fn generate() -> Self {
        Self(Ulid::new().to_string().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModelId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ModelId {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

fn state_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("state name pattern is valid"))
}

/// Label that models can be placed in (e.g. "shadow", "prod")
///
/// Only the syntax is checked here; whether a name is usable for a
/// user-defined state also depends on the reserved set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateName(String);

impl StateName {
    /// Parse a state name, checking its syntax
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !state_name_pattern().is_match(&name) {
            return Err(CatalogError::InvalidStateName(format!(
                "'{}' must be non-empty and contain only letters, digits, '-' or '_'",
                name
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The reserved state this name refers to, if any
    pub fn reserved(&self) -> Option<ReservedState> {
        ReservedState::from_name(&self.0)
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved().is_some()
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StateName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StateName {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<StateName> for String {
    fn from(name: StateName) -> Self {
        name.0
    }
}

impl From<ReservedState> for StateName {
    fn from(state: ReservedState) -> Self {
        Self(state.as_str().to_string())
    }
}

/// States managed by the catalog itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservedState {
    /// Tombstone written when a model is deleted
    Deleted,
}

impl ReservedState {
    pub const ALL: &'static [ReservedState] = &[ReservedState::Deleted];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservedState::Deleted => "deleted",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for ReservedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
