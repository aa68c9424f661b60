use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DatasetsClient, DatasetsError, Version};
use crate::models::State;

/// Version table standing in for the Datasets Service
#[derive(Debug, Default)]
pub struct InMemoryDatasets {
    versions: RwLock<Vec<Version>>,
}

impl InMemoryDatasets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(versions: Vec<Version>) -> Self {
        Self {
            versions: RwLock::new(versions),
        }
    }

    pub async fn seed_version(&self, version: Version) {
        self.versions.write().await.push(version);
    }

    pub async fn versions(&self) -> Vec<Version> {
        self.versions.read().await.clone()
    }

    fn not_found(versions: &[Version], dataset_id: &str, edition_id: &str, version_id: u32) -> DatasetsError {
        if !versions.iter().any(|v| v.dataset_id == dataset_id) {
            DatasetsError::DatasetNotFound {
                dataset_id: dataset_id.to_string(),
            }
        } else if !versions
            .iter()
            .any(|v| v.dataset_id == dataset_id && v.edition_id == edition_id)
        {
            DatasetsError::EditionNotFound {
                dataset_id: dataset_id.to_string(),
                edition_id: edition_id.to_string(),
            }
        } else {
            DatasetsError::VersionNotFound {
                dataset_id: dataset_id.to_string(),
                edition_id: edition_id.to_string(),
                version_id,
            }
        }
    }
}

fn is_version(v: &Version, dataset_id: &str, edition_id: &str, version_id: u32) -> bool {
    v.dataset_id == dataset_id && v.edition_id == edition_id && v.version == version_id
}

#[async_trait]
impl DatasetsClient for InMemoryDatasets {
    async fn get_version(
        &self,
        dataset_id: &str,
        edition_id: &str,
        version_id: u32,
    ) -> Result<Version, DatasetsError> {
        let versions = self.versions.read().await;
        versions
            .iter()
            .find(|v| is_version(v, dataset_id, edition_id, version_id))
            .cloned()
            .ok_or_else(|| Self::not_found(&versions, dataset_id, edition_id, version_id))
    }

    async fn set_version_state(
        &self,
        dataset_id: &str,
        edition_id: &str,
        version_id: u32,
        state: State,
    ) -> Result<(), DatasetsError> {
        let mut versions = self.versions.write().await;
        if let Some(version) = versions
            .iter_mut()
            .find(|v| is_version(v, dataset_id, edition_id, version_id))
        {
            version.state = state;
            return Ok(());
        }
        Err(Self::not_found(&versions, dataset_id, edition_id, version_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(dataset: &str, edition: &str, number: u32) -> Version {
        Version {
            dataset_id: dataset.to_string(),
            edition_id: edition.to_string(),
            version: number,
            state: State::Draft,
            release_date: None,
        }
    }

    #[tokio::test]
    async fn test_not_found_distinguishes_dataset_edition_version() {
        let datasets = InMemoryDatasets::with_versions(vec![version("cpih", "time-series", 1)]);

        assert!(matches!(
            datasets.get_version("gdp", "time-series", 1).await.unwrap_err(),
            DatasetsError::DatasetNotFound { .. }
        ));
        assert!(matches!(
            datasets.get_version("cpih", "2024", 1).await.unwrap_err(),
            DatasetsError::EditionNotFound { .. }
        ));
        assert!(matches!(
            datasets.get_version("cpih", "time-series", 9).await.unwrap_err(),
            DatasetsError::VersionNotFound { version_id: 9, .. }
        ));
    }

    #[tokio::test]
    async fn test_set_version_state() {
        let datasets = InMemoryDatasets::with_versions(vec![version("cpih", "time-series", 1)]);
        datasets
            .set_version_state("cpih", "time-series", 1, State::Published)
            .await
            .unwrap();

        let stored = datasets.get_version("cpih", "time-series", 1).await.unwrap();
        assert_eq!(stored.state, State::Published);
    }
}
