use crate::core::catalog;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a directory directly under the data root.
///
/// Constructing one only checks the name's shape; whether the directory
/// exists is decided by the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn parse(candidate: &str) -> Result<Self> {
        catalog::check_project_name(candidate)?;
        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An opened metrics file, read lazily by whoever sends it.
#[derive(Debug)]
pub struct MetricsFile {
    pub file_name: String,
    pub len: u64,
    pub file: tokio::fs::File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationsResponse {
    pub iterations: Vec<u64>,
}
