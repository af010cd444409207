//! Backend collaborator
//!
//! The remote side of every dataset verb. Implementations own transport,
//! authentication and pagination cursors; they report failures using the
//! kinds in [`crate::error::ErrorKind`] and never retry.

use super::model::{CreateDatasetOptions, Dataset, DatasetPage, DeleteDatasetOptions, ListDatasetsOptions};
use super::reference::{DatasetReference, ProjectReference};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait DatasetBackend: Send + Sync {
    async fn get_dataset(&self, reference: &DatasetReference) -> Result<Dataset>;

    /// Fetch one page; `page_token` is `None` for the first page
    async fn list_datasets_page(
        &self,
        project: &ProjectReference,
        options: &ListDatasetsOptions,
        page_token: Option<&str>,
    ) -> Result<DatasetPage>;

    async fn insert_dataset(
        &self,
        reference: &DatasetReference,
        options: &CreateDatasetOptions,
    ) -> Result<Dataset>;

    async fn delete_dataset(
        &self,
        reference: &DatasetReference,
        options: &DeleteDatasetOptions,
    ) -> Result<()>;
}

#[async_trait]
impl<B: DatasetBackend + ?Sized> DatasetBackend for Arc<B> {
    async fn get_dataset(&self, reference: &DatasetReference) -> Result<Dataset> {
        (**self).get_dataset(reference).await
    }

    async fn list_datasets_page(
        &self,
        project: &ProjectReference,
        options: &ListDatasetsOptions,
        page_token: Option<&str>,
    ) -> Result<DatasetPage> {
        (**self).list_datasets_page(project, options, page_token).await
    }

    async fn insert_dataset(
        &self,
        reference: &DatasetReference,
        options: &CreateDatasetOptions,
    ) -> Result<Dataset> {
        (**self).insert_dataset(reference, options).await
    }

    async fn delete_dataset(
        &self,
        reference: &DatasetReference,
        options: &DeleteDatasetOptions,
    ) -> Result<()> {
        (**self).delete_dataset(reference, options).await
    }
}
