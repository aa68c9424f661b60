//! Persistence seam for bundles, content items and audit events
//!
//! The transition engine and the service only ever reach storage through
//! [`Datastore`]. Writes that change a bundle recompute its fingerprint inside
//! the store so the CAS in [`Datastore::update_bundle`] stays atomic.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Bundle, ContentItem, Event, State, User};

pub use memory::InMemoryDatastore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bundle not found: {0}")]
    BundleNotFound(String),

    #[error("content item not found: {0}")]
    ContentItemNotFound(String),

    #[error("e_tag mismatch for bundle {id}")]
    EtagMismatch { id: String },

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("datastore unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn get_bundle(&self, id: &str) -> Result<Bundle, StoreError>;

    /// Bundles in stored order plus the total count before paging
    async fn list_bundles(&self, offset: usize, limit: usize) -> Result<(Vec<Bundle>, usize), StoreError>;

    /// Insert a new bundle and return it with its initial fingerprint
    async fn create_bundle(&self, bundle: &Bundle) -> Result<Bundle, StoreError>;

    /// Full replace, applied only while the stored e_tag equals `expected_etag`
    async fn update_bundle(
        &self,
        id: &str,
        bundle: &Bundle,
        expected_etag: &str,
    ) -> Result<Bundle, StoreError>;

    /// State-only write, applied only while the stored e_tag equals `expected_etag`
    async fn update_bundle_state(
        &self,
        id: &str,
        state: State,
        updated_by: &User,
        expected_etag: &str,
    ) -> Result<(), StoreError>;

    /// Bump the fingerprint after a mutation of an owned content item
    async fn update_bundle_etag(&self, id: &str, updated_by: &User) -> Result<Bundle, StoreError>;

    /// Remove a bundle together with its content items
    async fn delete_bundle(&self, id: &str) -> Result<(), StoreError>;

    async fn check_bundle_exists_by_title(
        &self,
        title: &str,
        exclude_id: Option<String>,
    ) -> Result<bool, StoreError>;

    /// Content items of a bundle in stored order
    async fn get_bundle_content_items(&self, bundle_id: &str) -> Result<Vec<ContentItem>, StoreError>;

    async fn get_content_item(&self, bundle_id: &str, content_item_id: &str) -> Result<ContentItem, StoreError>;

    async fn create_content_item(&self, item: &ContentItem) -> Result<(), StoreError>;

    async fn update_bundle_content_item_state(
        &self,
        content_item_id: &str,
        state: State,
    ) -> Result<(), StoreError>;

    async fn check_content_item_exists_by_dataset_edition_version(
        &self,
        dataset_id: &str,
        edition_id: &str,
        version_id: u32,
    ) -> Result<bool, StoreError>;

    async fn create_bundle_event(&self, event: &Event) -> Result<(), StoreError>;

    async fn list_bundle_events(
        &self,
        bundle_id: Option<String>,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Event>, usize), StoreError>;
}
