//! BigQuery dataset client
//!
//! Resolves bare, project-scoped or fully-qualified dataset identifiers to a
//! canonical [`DatasetReference`] and performs get, list, create,
//! get-or-create and delete against the BigQuery API.

pub mod config;
pub mod dataset;
pub mod error;
pub mod gcp;

pub use dataset::{
    BigqueryClient, CreateDatasetOptions, Dataset, DatasetBackend, DatasetCrud, DatasetReference,
    DatasetStream, DeleteDatasetOptions, ListDatasetsOptions, ProjectReference, ReferenceResolver,
    RestBackend,
};
pub use error::{BigqueryError, ErrorKind, Result};
