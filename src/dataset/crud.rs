//! Dataset CRUD surface
//!
//! [`DatasetCrud`] splits each verb into one canonical method taking a
//! fully-qualified reference, which implementors must provide, and a pair of
//! provided convenience methods that resolve partial identifiers and forward
//! to it. The get-or-create composite is also provided, in terms of the
//! canonical get and create.
//!
//! [`BigqueryClient`] implements the canonical methods over a
//! [`DatasetBackend`].

use super::backend::DatasetBackend;
use super::model::{CreateDatasetOptions, Dataset, DeleteDatasetOptions, ListDatasetsOptions};
use super::reference::{DatasetReference, ProjectReference};
use super::resolver::ReferenceResolver;
use super::stream::{list_stream, DatasetStream};
use crate::error::{BigqueryError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait DatasetCrud: Send + Sync {
    fn resolver(&self) -> &ReferenceResolver;

    // -------------------------------------------------------------------------
    // Canonical operations
    // -------------------------------------------------------------------------

    /// Fetch a dataset; NotFound, PermissionDenied, InvalidArgument or Unavailable on failure
    async fn get_dataset_ref(&self, reference: &DatasetReference) -> Result<Dataset>;

    /// Lazily list a project's datasets; the stream yields NotFound (unknown
    /// project), PermissionDenied or Unavailable
    fn list_datasets_ref(
        &self,
        project: &ProjectReference,
        options: ListDatasetsOptions,
    ) -> Result<DatasetStream<'_>>;

    /// Create a dataset; AlreadyExists, PermissionDenied, InvalidArgument or
    /// Unavailable on failure
    async fn create_dataset_ref(
        &self,
        reference: &DatasetReference,
        options: CreateDatasetOptions,
    ) -> Result<Dataset>;

    /// Delete a dataset; NotFound, PermissionDenied, InvalidArgument (dataset
    /// not empty) or Unavailable on failure
    async fn delete_dataset_ref(
        &self,
        reference: &DatasetReference,
        options: DeleteDatasetOptions,
    ) -> Result<()>;

    /// Fetch the dataset, creating it if it doesn't exist
    ///
    /// Not atomic. If the create loses a race to another caller
    /// (`AlreadyExists`), the dataset is fetched once more; if that fetch
    /// still finds nothing the backend is inconsistent and `Internal` is
    /// returned. Any other failure is passed through unchanged.
    async fn get_or_create_dataset_ref(
        &self,
        reference: &DatasetReference,
        options: CreateDatasetOptions,
    ) -> Result<Dataset> {
        match self.get_dataset_ref(reference).await {
            Err(err) if err.is_not_found() => {}
            found_or_failed => return found_or_failed,
        }

        match self.create_dataset_ref(reference, options).await {
            Err(err) if err.is_already_exists() => {
                tracing::warn!(
                    "Dataset {} was created concurrently, fetching it again",
                    reference
                );
                match self.get_dataset_ref(reference).await {
                    Err(err) if err.is_not_found() => Err(BigqueryError::internal(format!(
                        "dataset {} reported as existing but cannot be found: {}",
                        reference, err
                    ))),
                    refetched => refetched,
                }
            }
            created_or_failed => created_or_failed,
        }
    }

    // -------------------------------------------------------------------------
    // Convenience overloads
    // -------------------------------------------------------------------------

    /// Get a dataset in the default project
    async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let reference = self.resolver().resolve_dataset(None, dataset_id)?;
        self.get_dataset_ref(&reference).await
    }

    async fn get_dataset_in(&self, project_id: &str, dataset_id: &str) -> Result<Dataset> {
        let reference = self.resolver().resolve_dataset(Some(project_id), dataset_id)?;
        self.get_dataset_ref(&reference).await
    }

    /// List datasets in the default project
    fn list_datasets(&self, options: ListDatasetsOptions) -> Result<DatasetStream<'_>> {
        let project = self.resolver().resolve_project(None)?;
        self.list_datasets_ref(&project, options)
    }

    fn list_datasets_in(
        &self,
        project_id: &str,
        options: ListDatasetsOptions,
    ) -> Result<DatasetStream<'_>> {
        let project = self.resolver().resolve_project(Some(project_id))?;
        self.list_datasets_ref(&project, options)
    }

    /// Create a dataset in the default project
    async fn create_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let reference = self.resolver().resolve_dataset(None, dataset_id)?;
        self.create_dataset_ref(&reference, CreateDatasetOptions::default())
            .await
    }

    async fn create_dataset_in(&self, project_id: &str, dataset_id: &str) -> Result<Dataset> {
        let reference = self.resolver().resolve_dataset(Some(project_id), dataset_id)?;
        self.create_dataset_ref(&reference, CreateDatasetOptions::default())
            .await
    }

    async fn get_or_create_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let reference = self.resolver().resolve_dataset(None, dataset_id)?;
        self.get_or_create_dataset_ref(&reference, CreateDatasetOptions::default())
            .await
    }

    async fn get_or_create_dataset_in(
        &self,
        project_id: &str,
        dataset_id: &str,
    ) -> Result<Dataset> {
        let reference = self.resolver().resolve_dataset(Some(project_id), dataset_id)?;
        self.get_or_create_dataset_ref(&reference, CreateDatasetOptions::default())
            .await
    }

    /// Delete an empty dataset in the default project
    async fn delete_dataset(&self, dataset_id: &str) -> Result<()> {
        let reference = self.resolver().resolve_dataset(None, dataset_id)?;
        self.delete_dataset_ref(&reference, DeleteDatasetOptions::default())
            .await
    }

    async fn delete_dataset_in(&self, project_id: &str, dataset_id: &str) -> Result<()> {
        let reference = self.resolver().resolve_dataset(Some(project_id), dataset_id)?;
        self.delete_dataset_ref(&reference, DeleteDatasetOptions::default())
            .await
    }
}

/// Dataset client over a backend
///
/// Holds only the immutable default project and the backend, so it can be
/// shared freely between tasks.
#[derive(Clone)]
pub struct BigqueryClient<B> {
    resolver: ReferenceResolver,
    backend: B,
}

impl<B: DatasetBackend> BigqueryClient<B> {
    pub fn new(backend: B, default_project: Option<String>) -> Self {
        Self {
            resolver: ReferenceResolver::new(default_project),
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Reject references a caller built by hand with empty parts
fn check_project(project: &ProjectReference) -> Result<()> {
    if project.project_id.is_empty() {
        return Err(BigqueryError::invalid_argument(
            "project id must not be empty",
        ));
    }
    Ok(())
}

fn check_dataset(reference: &DatasetReference) -> Result<()> {
    if reference.project_id.is_empty() || reference.dataset_id.is_empty() {
        return Err(BigqueryError::invalid_argument(format!(
            "malformed dataset reference `{}`",
            reference
        )));
    }
    Ok(())
}

#[async_trait]
impl<B: DatasetBackend> DatasetCrud for BigqueryClient<B> {
    fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    async fn get_dataset_ref(&self, reference: &DatasetReference) -> Result<Dataset> {
        check_dataset(reference)?;
        tracing::debug!("Fetching dataset {}", reference);
        self.backend.get_dataset(reference).await
    }

    fn list_datasets_ref(
        &self,
        project: &ProjectReference,
        options: ListDatasetsOptions,
    ) -> Result<DatasetStream<'_>> {
        check_project(project)?;
        tracing::debug!("Listing datasets in {} ({:?})", project, options);
        Ok(list_stream(&self.backend, project.clone(), options))
    }

    async fn create_dataset_ref(
        &self,
        reference: &DatasetReference,
        options: CreateDatasetOptions,
    ) -> Result<Dataset> {
        check_dataset(reference)?;
        tracing::info!("Creating dataset {}", reference);
        self.backend.insert_dataset(reference, &options).await
    }

    async fn delete_dataset_ref(
        &self,
        reference: &DatasetReference,
        options: DeleteDatasetOptions,
    ) -> Result<()> {
        check_dataset(reference)?;
        tracing::info!(
            "Deleting dataset {} (delete_contents: {})",
            reference,
            options.delete_contents
        );
        self.backend.delete_dataset(reference, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::model::DatasetPage;
    use crate::error::ErrorKind;

    /// Backend that must never be reached
    struct Unreachable;

    #[async_trait]
    impl DatasetBackend for Unreachable {
        async fn get_dataset(&self, reference: &DatasetReference) -> Result<Dataset> {
            panic!("unexpected get of {reference}")
        }

        async fn list_datasets_page(
            &self,
            project: &ProjectReference,
            _options: &ListDatasetsOptions,
            _page_token: Option<&str>,
        ) -> Result<DatasetPage> {
            panic!("unexpected list of {project}")
        }

        async fn insert_dataset(
            &self,
            reference: &DatasetReference,
            _options: &CreateDatasetOptions,
        ) -> Result<Dataset> {
            panic!("unexpected insert of {reference}")
        }

        async fn delete_dataset(
            &self,
            reference: &DatasetReference,
            _options: &DeleteDatasetOptions,
        ) -> Result<()> {
            panic!("unexpected delete of {reference}")
        }
    }

    #[test]
    fn test_unresolvable_overloads_fail_before_any_call() {
        let client = BigqueryClient::new(Unreachable, None);

        let err = tokio_test::block_on(client.get_dataset("sales")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = tokio_test::block_on(client.create_dataset("sales")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = tokio_test::block_on(client.get_or_create_dataset("sales")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = tokio_test::block_on(client.delete_dataset("sales")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(client.list_datasets(ListDatasetsOptions::default()).is_err());
    }

    #[test]
    fn test_hand_built_empty_reference_is_rejected() {
        let client = BigqueryClient::new(Unreachable, Some("proj-a".to_string()));

        let err = tokio_test::block_on(
            client.get_dataset_ref(&DatasetReference::new("proj-a", "")),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = tokio_test::block_on(client.create_dataset_ref(
            &DatasetReference::new("", "sales"),
            CreateDatasetOptions::default(),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(client
            .list_datasets_ref(&ProjectReference::new(""), ListDatasetsOptions::default())
            .is_err());
    }
}
