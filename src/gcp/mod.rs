//! GCP API interaction module
//!
//! Authentication, HTTP plumbing and URL construction for the BigQuery REST
//! API. The dataset layer talks to the service only through [`client::GcpClient`].
//!
//! # Module Structure
//!
//! - [`auth`] - Application Default Credentials, static tokens, default project discovery
//! - [`client`] - Main GCP client for making API requests
//! - [`http`] - HTTP utilities and status-to-error classification
//!
//! # Example
//!
//! ```ignore
//! use bqctl::gcp::{auth::GcpCredentials, client::GcpClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new(GcpCredentials::new().await?)?;
//!     let dataset = client.get(&client.dataset_url("my-project", "sales"), &[]).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
