//! Dataset resource and per-verb option types

use super::reference::DatasetReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dataset as last fetched from the service
///
/// This is a snapshot: it is never refreshed after the call that produced it.
/// List results carry only a subset of the metadata, so everything except the
/// reference is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(rename = "datasetReference")]
    pub reference: DatasetReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Milliseconds since the epoch, as a decimal string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    /// Milliseconds since the epoch, as a decimal string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl Dataset {
    /// A dataset with no metadata beyond its identity
    pub fn new(reference: DatasetReference) -> Self {
        Self {
            reference,
            id: None,
            friendly_name: None,
            description: None,
            location: None,
            labels: BTreeMap::new(),
            creation_time: None,
            last_modified_time: None,
            etag: None,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.creation_time.as_deref().and_then(parse_epoch_millis)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.last_modified_time.as_deref().and_then(parse_epoch_millis)
    }
}

fn parse_epoch_millis(value: &str) -> Option<DateTime<Utc>> {
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Options for listing datasets; the default instance means backend defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDatasetsOptions {
    /// Upper bound on datasets per page (`maxResults`)
    pub page_size: Option<u32>,
    /// Label filter, e.g. `labels.env:prod`
    pub filter: Option<String>,
    /// Include hidden datasets
    pub all: bool,
}

impl ListDatasetsOptions {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Metadata to attach to a dataset at creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateDatasetOptions {
    pub friendly_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteDatasetOptions {
    /// Delete contained tables too; otherwise a non-empty dataset is refused
    pub delete_contents: bool,
}

/// One page of a dataset listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetPage {
    pub datasets: Vec<Dataset>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_dataset() {
        let dataset: Dataset = serde_json::from_value(json!({
            "kind": "bigquery#dataset",
            "etag": "abc==",
            "id": "proj-a:sales",
            "selfLink": "https://bigquery.googleapis.com/bigquery/v2/projects/proj-a/datasets/sales",
            "datasetReference": {"projectId": "proj-a", "datasetId": "sales"},
            "friendlyName": "Sales",
            "labels": {"env": "prod"},
            "creationTime": "1700000000000",
            "lastModifiedTime": "1700000500000",
            "location": "EU"
        }))
        .unwrap();

        assert_eq!(dataset.reference, DatasetReference::new("proj-a", "sales"));
        assert_eq!(dataset.friendly_name.as_deref(), Some("Sales"));
        assert_eq!(dataset.labels.get("env").map(String::as_str), Some("prod"));
        assert_eq!(dataset.location.as_deref(), Some("EU"));
        assert_eq!(
            dataset.created_at().map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(
            dataset.modified_at().map(|t| t.timestamp()),
            Some(1_700_000_500)
        );
    }

    #[test]
    fn test_deserialize_list_entry_with_sparse_metadata() {
        let dataset: Dataset = serde_json::from_value(json!({
            "kind": "bigquery#dataset",
            "id": "proj-a:sales",
            "datasetReference": {"projectId": "proj-a", "datasetId": "sales"}
        }))
        .unwrap();

        assert_eq!(dataset, Dataset {
            id: Some("proj-a:sales".to_string()),
            ..Dataset::new(DatasetReference::new("proj-a", "sales"))
        });
        assert_eq!(dataset.created_at(), None);
    }

    #[test]
    fn test_bad_timestamp_is_ignored() {
        let mut dataset = Dataset::new(DatasetReference::new("p", "d"));
        dataset.creation_time = Some("not-a-number".to_string());
        assert_eq!(dataset.created_at(), None);
    }
}
