//! Dataset resolution and CRUD
//!
//! # Architecture
//!
//! - [`reference`] - Project and dataset reference value types
//! - [`resolver`] - Fills in the default project for partial identifiers
//! - [`model`] - The dataset resource and per-verb options
//! - [`backend`] - The remote collaborator trait
//! - [`rest`] - Backend over the BigQuery v2 REST API
//! - [`stream`] - Lazy paginated listing
//! - [`crud`] - Canonical operations, convenience overloads, get-or-create
//!
//! # Example
//!
//! ```ignore
//! use bqctl::dataset::{BigqueryClient, DatasetCrud, RestBackend};
//!
//! async fn ensure_sales(client: &BigqueryClient<RestBackend>) -> bqctl::Result<()> {
//!     let dataset = client.get_or_create_dataset_in("proj-a", "sales").await?;
//!     println!("{}", dataset.reference);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod crud;
pub mod model;
pub mod reference;
pub mod resolver;
pub mod rest;
pub mod stream;

pub use backend::DatasetBackend;
pub use crud::{BigqueryClient, DatasetCrud};
pub use model::{
    CreateDatasetOptions, Dataset, DatasetPage, DeleteDatasetOptions, ListDatasetsOptions,
};
pub use reference::{DatasetReference, ProjectReference};
pub use resolver::ReferenceResolver;
pub use rest::RestBackend;
pub use stream::DatasetStream;
