use serde::{Deserialize, Serialize};

use super::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Dataset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub dataset_id: String,
    pub edition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub version_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLinks {
    pub edit: String,
    pub preview: String,
}

/// A single dataset-version reference inside a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub bundle_id: String,
    pub content_type: ContentType,
    pub metadata: ContentMetadata,
    pub links: ContentLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

impl ContentItem {
    pub fn path(&self) -> String {
        content_item_path(&self.bundle_id, &self.id)
    }

    /// The (dataset, edition, version) tuple that must be unique system-wide
    pub fn version_key(&self) -> VersionKey<'_> {
        VersionKey {
            dataset_id: &self.metadata.dataset_id,
            edition_id: &self.metadata.edition_id,
            version_id: self.metadata.version_id,
        }
    }
}

pub fn content_item_path(bundle_id: &str, content_item_id: &str) -> String {
    format!("/bundles/{bundle_id}/contents/{content_item_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionKey<'a> {
    pub dataset_id: &'a str,
    pub edition_id: &'a str,
    pub version_id: u32,
}

impl std::fmt::Display for VersionKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/editions/{}/versions/{}",
            self.dataset_id, self.edition_id, self.version_id
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadataPayload {
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub edition_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLinksPayload {
    #[serde(default)]
    pub edit: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
}

/// Caller-supplied content item body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItemPayload {
    #[serde(default)]
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub metadata: ContentMetadataPayload,
    #[serde(default)]
    pub links: ContentLinksPayload,
}
