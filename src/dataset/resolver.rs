//! Reference resolution
//!
//! Turns bare or partial identifiers into canonical references, filling in
//! the client's default project when none is given. No I/O.

use super::reference::{DatasetReference, ProjectReference};
use crate::error::{BigqueryError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceResolver {
    default_project: Option<String>,
}

impl ReferenceResolver {
    /// An empty default project is treated as unset
    pub fn new(default_project: Option<String>) -> Self {
        Self {
            default_project: default_project.filter(|p| !p.is_empty()),
        }
    }

    pub fn default_project(&self) -> Option<&str> {
        self.default_project.as_deref()
    }

    pub fn resolve_project(&self, project_id: Option<&str>) -> Result<ProjectReference> {
        let project_id = match project_id {
            Some(project_id) => project_id,
            None => self.default_project().ok_or_else(|| {
                BigqueryError::invalid_argument(
                    "no project id given and no default project configured",
                )
            })?,
        };

        if project_id.is_empty() {
            return Err(BigqueryError::invalid_argument(
                "project id must not be empty",
            ));
        }

        Ok(ProjectReference::new(project_id))
    }

    pub fn resolve_dataset(
        &self,
        project_id: Option<&str>,
        dataset_id: &str,
    ) -> Result<DatasetReference> {
        if dataset_id.is_empty() {
            return Err(BigqueryError::invalid_argument(
                "dataset id must not be empty",
            ));
        }

        let project = self.resolve_project(project_id)?;
        Ok(DatasetReference {
            project_id: project.project_id,
            dataset_id: dataset_id.to_string(),
        })
    }
}
