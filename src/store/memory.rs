use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Datastore, StoreError};
use crate::concurrency::compute_etag;
use crate::models::{Bundle, ContentItem, Event, State, User};

#[derive(Debug, Default)]
struct Collections {
    bundles: Vec<Bundle>,
    content_items: Vec<ContentItem>,
    events: Vec<Event>,
}

impl Collections {
    fn bundle_mut(&mut self, id: &str) -> Result<&mut Bundle, StoreError> {
        self.bundles
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::BundleNotFound(id.to_string()))
    }
}

/// Insertion-ordered store guarded by a single lock, so every write including
/// the e_tag compare-and-swap is atomic
#[derive(Debug, Default)]
pub struct InMemoryDatastore {
    inner: RwLock<Collections>,
}

fn page<T: Clone>(items: impl Iterator<Item = T>, offset: usize, limit: usize) -> (Vec<T>, usize) {
    let all: Vec<T> = items.collect();
    let total = all.len();
    let items = all.into_iter().skip(offset).take(limit).collect();
    (items, total)
}

fn touch(bundle: &mut Bundle, updated_by: &User) -> Result<(), StoreError> {
    bundle.last_updated_by = Some(updated_by.clone());
    bundle.updated_at = Some(Utc::now());
    bundle.e_tag = compute_etag(bundle, &bundle.e_tag)?;
    Ok(())
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bundle exactly as given, fingerprint included
    pub async fn seed_bundle(&self, bundle: Bundle) {
        self.inner.write().await.bundles.push(bundle);
    }

    pub async fn seed_content_item(&self, item: ContentItem) {
        self.inner.write().await.content_items.push(item);
    }

    pub async fn bundles(&self) -> Vec<Bundle> {
        self.inner.read().await.bundles.clone()
    }

    pub async fn content_items(&self) -> Vec<ContentItem> {
        self.inner.read().await.content_items.clone()
    }

    pub async fn events(&self) -> Vec<Event> {
        self.inner.read().await.events.clone()
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn get_bundle(&self, id: &str) -> Result<Bundle, StoreError> {
        self.inner
            .read()
            .await
            .bundles
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| StoreError::BundleNotFound(id.to_string()))
    }

    async fn list_bundles(&self, offset: usize, limit: usize) -> Result<(Vec<Bundle>, usize), StoreError> {
        let inner = self.inner.read().await;
        Ok(page(inner.bundles.iter().cloned(), offset, limit))
    }

    async fn create_bundle(&self, bundle: &Bundle) -> Result<Bundle, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.bundles.iter().any(|b| b.id == bundle.id) {
            return Err(StoreError::Duplicate(format!("bundle {}", bundle.id)));
        }

        let mut stored = bundle.clone();
        stored.e_tag = compute_etag(&stored, "")?;
        inner.bundles.push(stored.clone());
        Ok(stored)
    }

    async fn update_bundle(
        &self,
        id: &str,
        bundle: &Bundle,
        expected_etag: &str,
    ) -> Result<Bundle, StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner.bundle_mut(id)?;
        if stored.e_tag != expected_etag {
            return Err(StoreError::EtagMismatch { id: id.to_string() });
        }

        let mut replacement = bundle.clone();
        replacement.id = id.to_string();
        replacement.e_tag = compute_etag(&replacement, &stored.e_tag)?;
        *stored = replacement.clone();
        Ok(replacement)
    }

    async fn update_bundle_state(
        &self,
        id: &str,
        state: State,
        updated_by: &User,
        expected_etag: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner.bundle_mut(id)?;
        if stored.e_tag != expected_etag {
            return Err(StoreError::EtagMismatch { id: id.to_string() });
        }
        stored.state = state;
        touch(stored, updated_by)
    }

    async fn update_bundle_etag(&self, id: &str, updated_by: &User) -> Result<Bundle, StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner.bundle_mut(id)?;
        touch(stored, updated_by)?;
        Ok(stored.clone())
    }

    async fn delete_bundle(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.bundles.len();
        inner.bundles.retain(|b| b.id != id);
        if inner.bundles.len() == before {
            return Err(StoreError::BundleNotFound(id.to_string()));
        }
        inner.content_items.retain(|item| item.bundle_id != id);
        Ok(())
    }

    async fn check_bundle_exists_by_title(
        &self,
        title: &str,
        exclude_id: Option<String>,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.bundles.iter().any(|b| {
            b.title == title && exclude_id.as_deref().map_or(true, |excluded| b.id != excluded)
        }))
    }

    async fn get_bundle_content_items(&self, bundle_id: &str) -> Result<Vec<ContentItem>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .content_items
            .iter()
            .filter(|item| item.bundle_id == bundle_id)
            .cloned()
            .collect())
    }

    async fn get_content_item(&self, bundle_id: &str, content_item_id: &str) -> Result<ContentItem, StoreError> {
        let inner = self.inner.read().await;
        inner
            .content_items
            .iter()
            .find(|item| item.id == content_item_id && item.bundle_id == bundle_id)
            .cloned()
            .ok_or_else(|| StoreError::ContentItemNotFound(content_item_id.to_string()))
    }

    async fn create_content_item(&self, item: &ContentItem) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = item.version_key();
        if inner
            .content_items
            .iter()
            .any(|existing| existing.id == item.id || existing.version_key() == key)
        {
            return Err(StoreError::Duplicate(format!("content item {key}")));
        }
        inner.content_items.push(item.clone());
        Ok(())
    }

    async fn update_bundle_content_item_state(
        &self,
        content_item_id: &str,
        state: State,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let item = inner
            .content_items
            .iter_mut()
            .find(|item| item.id == content_item_id)
            .ok_or_else(|| StoreError::ContentItemNotFound(content_item_id.to_string()))?;
        item.state = Some(state);
        Ok(())
    }

    async fn check_content_item_exists_by_dataset_edition_version(
        &self,
        dataset_id: &str,
        edition_id: &str,
        version_id: u32,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.content_items.iter().any(|item| {
            item.metadata.dataset_id == dataset_id
                && item.metadata.edition_id == edition_id
                && item.metadata.version_id == version_id
        }))
    }

    async fn create_bundle_event(&self, event: &Event) -> Result<(), StoreError> {
        self.inner.write().await.events.push(event.clone());
        Ok(())
    }

    async fn list_bundle_events(
        &self,
        bundle_id: Option<String>,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Event>, usize), StoreError> {
        let inner = self.inner.read().await;
        let matching = inner.events.iter().filter(|event| {
            bundle_id
                .as_deref()
                .map_or(true, |id| event.bundle_id() == id)
        });
        Ok(page(matching.cloned(), offset, limit))
    }
}
