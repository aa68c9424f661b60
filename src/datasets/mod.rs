//! Datasets Service seam - the source of truth for a dataset version's own state

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::State;

pub use memory::InMemoryDatasets;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub dataset_id: String,
    pub edition_id: String,
    pub version: u32,
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetsError {
    #[error("dataset not found: {dataset_id}")]
    DatasetNotFound { dataset_id: String },

    #[error("edition not found: {dataset_id}/{edition_id}")]
    EditionNotFound { dataset_id: String, edition_id: String },

    #[error("version not found: {dataset_id}/{edition_id}/{version_id}")]
    VersionNotFound {
        dataset_id: String,
        edition_id: String,
        version_id: u32,
    },

    #[error("datasets service unavailable: {0}")]
    Unavailable(String),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DatasetsClient: Send + Sync {
    async fn get_version(
        &self,
        dataset_id: &str,
        edition_id: &str,
        version_id: u32,
    ) -> Result<Version, DatasetsError>;

    async fn set_version_state(
        &self,
        dataset_id: &str,
        edition_id: &str,
        version_id: u32,
        state: State,
    ) -> Result<(), DatasetsError>;
}
