//! BigQuery v2 REST backend

use super::backend::DatasetBackend;
use super::model::{CreateDatasetOptions, Dataset, DatasetPage, DeleteDatasetOptions, ListDatasetsOptions};
use super::reference::{DatasetReference, ProjectReference};
use crate::error::{BigqueryError, Result};
use crate::gcp::client::GcpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Dataset backend over the BigQuery REST API
#[derive(Clone)]
pub struct RestBackend {
    client: GcpClient,
}

impl RestBackend {
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertRequest<'a> {
    dataset_reference: &'a DatasetReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    friendly_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    labels: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    datasets: Vec<Dataset>,
    #[serde(default)]
    next_page_token: Option<String>,
}

fn decode<T: for<'de> Deserialize<'de>>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| BigqueryError::internal(format!("could not decode {}: {}", what, e)))
}

fn list_query(options: &ListDatasetsOptions, page_token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(page_size) = options.page_size {
        query.push(("maxResults", page_size.to_string()));
    }
    if let Some(filter) = &options.filter {
        query.push(("filter", filter.clone()));
    }
    if options.all {
        query.push(("all", "true".to_string()));
    }
    if let Some(token) = page_token {
        query.push(("pageToken", token.to_string()));
    }
    query
}

#[async_trait]
impl DatasetBackend for RestBackend {
    async fn get_dataset(&self, reference: &DatasetReference) -> Result<Dataset> {
        let url = self
            .client
            .dataset_url(&reference.project_id, &reference.dataset_id);
        let response = self.client.get(&url, &[]).await?;
        decode(response, "dataset")
    }

    async fn list_datasets_page(
        &self,
        project: &ProjectReference,
        options: &ListDatasetsOptions,
        page_token: Option<&str>,
    ) -> Result<DatasetPage> {
        let url = self.client.datasets_url(&project.project_id);
        let response = self.client.get(&url, &list_query(options, page_token)).await?;
        let list: ListResponse = decode(response, "dataset list")?;

        tracing::debug!(
            "Listed {} datasets in {} (more: {})",
            list.datasets.len(),
            project,
            list.next_page_token.is_some()
        );

        Ok(DatasetPage {
            datasets: list.datasets,
            // An empty token means no further pages
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn insert_dataset(
        &self,
        reference: &DatasetReference,
        options: &CreateDatasetOptions,
    ) -> Result<Dataset> {
        let url = self.client.datasets_url(&reference.project_id);
        let body = serde_json::to_value(InsertRequest {
            dataset_reference: reference,
            friendly_name: options.friendly_name.as_deref(),
            description: options.description.as_deref(),
            location: options.location.as_deref(),
            labels: &options.labels,
        })
        .map_err(|e| BigqueryError::internal(format!("could not encode dataset: {}", e)))?;

        let response = self.client.post(&url, Some(&body)).await?;
        decode(response, "created dataset")
    }

    async fn delete_dataset(
        &self,
        reference: &DatasetReference,
        options: &DeleteDatasetOptions,
    ) -> Result<()> {
        let url = self
            .client
            .dataset_url(&reference.project_id, &reference.dataset_id);
        let query = if options.delete_contents {
            vec![("deleteContents", "true".to_string())]
        } else {
            Vec::new()
        };
        self.client.delete(&url, &query).await?;
        Ok(())
    }
}
