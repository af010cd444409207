//! Project and dataset references
//!
//! Immutable identifiers for a project (the owning scope) and for a dataset
//! within a project. Serialized in the BigQuery wire shape.

use crate::error::{BigqueryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Identifies a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReference {
    pub project_id: String,
}

impl ProjectReference {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

impl Display for ProjectReference {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}", self.project_id)
    }
}

/// Identifies a dataset within a project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReference {
    pub project_id: String,
    pub dataset_id: String,
}

impl DatasetReference {
    pub fn new(project_id: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
        }
    }

    /// The project that owns this dataset
    pub fn project(&self) -> ProjectReference {
        ProjectReference::new(self.project_id.clone())
    }
}

/// Renders as `project:dataset`, the fully-qualified dataset id BigQuery uses
impl Display for DatasetReference {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}:{}", self.project_id, self.dataset_id)
    }
}

/// A plain project id, or a domain-scoped one such as `example.com:proj`
fn is_project_part(project: &str) -> bool {
    match project.split_once(':') {
        Some((domain, id)) => {
            !domain.is_empty() && !id.is_empty() && !id.contains(|c: char| c == ':' || c == '.')
        }
        None => !project.is_empty() && !project.contains('.'),
    }
}

/// Accepts `project:dataset` or `project.dataset`, where the project may be
/// domain-scoped (`example.com:proj:dataset`, `example.com:proj.dataset`)
impl FromStr for DatasetReference {
    type Err = BigqueryError;

    fn from_str(string: &str) -> Result<Self> {
        let split = match string.rsplit_once(':') {
            Some((project, dataset)) if !dataset.contains('.') => Some((project, dataset)),
            _ => string.rsplit_once('.'),
        };

        match split {
            Some((project, dataset)) if is_project_part(project) && !dataset.is_empty() => {
                Ok(Self::new(project, dataset))
            }
            _ => Err(BigqueryError::invalid_argument(format!(
                "expected <project>:<dataset>, got: {}",
                string
            ))),
        }
    }
}
