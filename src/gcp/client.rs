//! GCP Client
//!
//! Main client for interacting with the BigQuery REST API, combining
//! authentication and HTTP functionality.

use super::auth::GcpCredentials;
use super::http::{GcpHttpClient, DEFAULT_TIMEOUT};
use crate::error::{BigqueryError, Result};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Base URL of the BigQuery v2 REST API
pub const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    endpoint: String,
}

impl GcpClient {
    /// Create a client against the public BigQuery endpoint
    pub fn new(credentials: GcpCredentials) -> Result<Self> {
        Self::with_endpoint(credentials, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// Create a client against a custom endpoint (emulators, tests, proxies)
    pub fn with_endpoint(
        credentials: GcpCredentials,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let parsed = Url::parse(endpoint).map_err(|e| {
            BigqueryError::invalid_argument(format!("invalid endpoint `{}`: {}", endpoint, e))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(BigqueryError::invalid_argument(format!(
                "invalid endpoint `{}`",
                endpoint
            )));
        }

        Ok(Self {
            credentials,
            http: GcpHttpClient::new(timeout)?,
            endpoint: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await.map_err(BigqueryError::Auth)
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token, query).await
    }

    /// Make a POST request to a GCP API
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.post(url, &token, body).await
    }

    /// Make a DELETE request to a GCP API
    pub async fn delete(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.delete(url, &token, query).await
    }

    // =========================================================================
    // BigQuery API helpers
    // =========================================================================

    /// Build the dataset collection URL of a project
    pub fn datasets_url(&self, project_id: &str) -> String {
        format!(
            "{}/projects/{}/datasets",
            self.endpoint,
            urlencoding::encode(project_id)
        )
    }

    /// Build the URL of a single dataset
    pub fn dataset_url(&self, project_id: &str, dataset_id: &str) -> String {
        format!(
            "{}/{}",
            self.datasets_url(project_id),
            urlencoding::encode(dataset_id)
        )
    }
}
