//! Shared builders and an in-memory harness for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bundle_api::datasets::{Version, InMemoryDatasets};
use bundle_api::models::{
    Bundle, BundleType, ContentItem, ContentItemPayload, ContentLinks, ContentLinksPayload,
    ContentMetadata, ContentMetadataPayload, ContentType, Event, PreviewTeam, State, User,
};
use bundle_api::store::StoreError;
use bundle_api::{
    compute_etag, BundleApiConfig, BundleService, CallerIdentity, DatasetsClient, Datastore,
    InMemoryDatastore, RequestContext,
};

pub const EDITION: &str = "time-series";

pub fn ctx() -> RequestContext {
    RequestContext::new(CallerIdentity::new("user-1", "publisher@example.com"))
}

/// A stored bundle with a valid fingerprint
pub fn bundle(id: &str, state: State) -> Bundle {
    let mut bundle = Bundle {
        id: id.to_string(),
        bundle_type: BundleType::Manual,
        created_by: Some(User {
            email: "creator@example.com".to_string(),
        }),
        created_at: None,
        last_updated_by: None,
        preview_teams: vec![PreviewTeam {
            id: "team-a".to_string(),
        }],
        scheduled_at: None,
        state,
        title: format!("Bundle {id}"),
        updated_at: None,
        e_tag: String::new(),
    };
    bundle.e_tag = compute_etag(&bundle, "").expect("fixture bundle serializes");
    bundle
}

pub fn content_item(id: &str, bundle_id: &str, dataset_id: &str, state: Option<State>) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        bundle_id: bundle_id.to_string(),
        content_type: ContentType::Dataset,
        metadata: ContentMetadata {
            dataset_id: dataset_id.to_string(),
            edition_id: EDITION.to_string(),
            title: Some(format!("Dataset {dataset_id}")),
            version_id: 1,
        },
        links: ContentLinks {
            edit: format!("/data-admin/edit/{dataset_id}"),
            preview: format!("/data-admin/preview/{dataset_id}"),
        },
        state,
    }
}

pub fn version(dataset_id: &str, state: State) -> Version {
    Version {
        dataset_id: dataset_id.to_string(),
        edition_id: EDITION.to_string(),
        version: 1,
        state,
        release_date: None,
    }
}

pub fn content_payload(bundle_id: &str, dataset_id: &str, version_id: i64) -> ContentItemPayload {
    ContentItemPayload {
        bundle_id: Some(bundle_id.to_string()),
        content_type: Some(ContentType::Dataset),
        metadata: ContentMetadataPayload {
            dataset_id: Some(dataset_id.to_string()),
            edition_id: Some(EDITION.to_string()),
            title: None,
            version_id: Some(version_id),
        },
        links: ContentLinksPayload {
            edit: Some(format!("/data-admin/edit/{dataset_id}")),
            preview: Some(format!("/data-admin/preview/{dataset_id}")),
        },
    }
}

/// In-memory store and datasets service wired into a `BundleService`
pub struct Harness {
    pub store: Arc<InMemoryDatastore>,
    pub datasets: Arc<InMemoryDatasets>,
    pub service: BundleService,
}

impl Harness {
    pub fn new() -> Self {
        let datasets = Arc::new(InMemoryDatasets::new());
        Self::with_datasets(datasets.clone(), datasets)
    }

    /// Harness whose service talks to `client` while `datasets` stays inspectable
    pub fn with_datasets(datasets: Arc<InMemoryDatasets>, client: Arc<dyn DatasetsClient>) -> Self {
        let store = Arc::new(InMemoryDatastore::new());
        Self::build(store.clone(), store as Arc<dyn Datastore>, datasets, client)
    }

    /// Harness whose service reaches the in-memory store through `wrap`
    pub fn with_store(wrap: impl FnOnce(Arc<InMemoryDatastore>) -> Arc<dyn Datastore>) -> Self {
        let store = Arc::new(InMemoryDatastore::new());
        let datasets = Arc::new(InMemoryDatasets::new());
        Self::build(store.clone(), wrap(store), datasets.clone(), datasets)
    }

    fn build(
        store: Arc<InMemoryDatastore>,
        service_store: Arc<dyn Datastore>,
        datasets: Arc<InMemoryDatasets>,
        client: Arc<dyn DatasetsClient>,
    ) -> Self {
        let service = BundleService::new(service_store, client, &BundleApiConfig::default());
        Self {
            store,
            datasets,
            service,
        }
    }

    pub async fn seed_bundle(&self, id: &str, state: State) -> Bundle {
        let bundle = bundle(id, state);
        self.store.seed_bundle(bundle.clone()).await;
        bundle
    }

    /// Seed a content item for `dataset_id` together with its dataset version
    pub async fn seed_item(
        &self,
        id: &str,
        bundle_id: &str,
        dataset_id: &str,
        item_state: Option<State>,
        version_state: State,
    ) -> ContentItem {
        let item = content_item(id, bundle_id, dataset_id, item_state);
        self.store.seed_content_item(item.clone()).await;
        self.datasets.seed_version(version(dataset_id, version_state)).await;
        item
    }

    pub async fn item_state(&self, id: &str) -> Option<State> {
        self.store
            .content_items()
            .await
            .into_iter()
            .find(|item| item.id == id)
            .and_then(|item| item.state)
    }

    pub async fn version_state(&self, dataset_id: &str) -> Option<State> {
        self.datasets
            .versions()
            .await
            .into_iter()
            .find(|v| v.dataset_id == dataset_id)
            .map(|v| v.state)
    }

    pub async fn stored_bundle(&self, id: &str) -> Bundle {
        self.store.get_bundle(id).await.expect("bundle is stored")
    }
}

/// Delegates to the in-memory store, optionally yielding to other tasks after
/// every bundle read and failing content item state writes for one item
pub struct InterposedStore {
    inner: Arc<InMemoryDatastore>,
    yield_after_read: bool,
    fail_item_state_for: Option<String>,
}

impl InterposedStore {
    pub fn new(inner: Arc<InMemoryDatastore>) -> Self {
        Self {
            inner,
            yield_after_read: false,
            fail_item_state_for: None,
        }
    }

    /// Let a concurrent request read the same bundle before this one acts on it
    pub fn yielding_reads(mut self) -> Self {
        self.yield_after_read = true;
        self
    }

    pub fn failing_item_state(mut self, content_item_id: &str) -> Self {
        self.fail_item_state_for = Some(content_item_id.to_string());
        self
    }
}

#[async_trait]
impl Datastore for InterposedStore {
    async fn get_bundle(&self, id: &str) -> Result<Bundle, StoreError> {
        let bundle = self.inner.get_bundle(id).await;
        if self.yield_after_read {
            tokio::task::yield_now().await;
        }
        bundle
    }

    async fn list_bundles(&self, offset: usize, limit: usize) -> Result<(Vec<Bundle>, usize), StoreError> {
        self.inner.list_bundles(offset, limit).await
    }

    async fn create_bundle(&self, bundle: &Bundle) -> Result<Bundle, StoreError> {
        self.inner.create_bundle(bundle).await
    }

    async fn update_bundle(
        &self,
        id: &str,
        bundle: &Bundle,
        expected_etag: &str,
    ) -> Result<Bundle, StoreError> {
        self.inner.update_bundle(id, bundle, expected_etag).await
    }

    async fn update_bundle_state(
        &self,
        id: &str,
        state: State,
        updated_by: &User,
        expected_etag: &str,
    ) -> Result<(), StoreError> {
        self.inner
            .update_bundle_state(id, state, updated_by, expected_etag)
            .await
    }

    async fn update_bundle_etag(&self, id: &str, updated_by: &User) -> Result<Bundle, StoreError> {
        self.inner.update_bundle_etag(id, updated_by).await
    }

    async fn delete_bundle(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete_bundle(id).await
    }

    async fn check_bundle_exists_by_title(
        &self,
        title: &str,
        exclude_id: Option<String>,
    ) -> Result<bool, StoreError> {
        self.inner.check_bundle_exists_by_title(title, exclude_id).await
    }

    async fn get_bundle_content_items(&self, bundle_id: &str) -> Result<Vec<ContentItem>, StoreError> {
        self.inner.get_bundle_content_items(bundle_id).await
    }

    async fn get_content_item(&self, bundle_id: &str, content_item_id: &str) -> Result<ContentItem, StoreError> {
        self.inner.get_content_item(bundle_id, content_item_id).await
    }

    async fn create_content_item(&self, item: &ContentItem) -> Result<(), StoreError> {
        self.inner.create_content_item(item).await
    }

    async fn update_bundle_content_item_state(
        &self,
        content_item_id: &str,
        state: State,
    ) -> Result<(), StoreError> {
        if self.fail_item_state_for.as_deref() == Some(content_item_id) {
            return Err(StoreError::Unavailable("write timed out".to_string()));
        }
        self.inner
            .update_bundle_content_item_state(content_item_id, state)
            .await
    }

    async fn check_content_item_exists_by_dataset_edition_version(
        &self,
        dataset_id: &str,
        edition_id: &str,
        version_id: u32,
    ) -> Result<bool, StoreError> {
        self.inner
            .check_content_item_exists_by_dataset_edition_version(dataset_id, edition_id, version_id)
            .await
    }

    async fn create_bundle_event(&self, event: &Event) -> Result<(), StoreError> {
        self.inner.create_bundle_event(event).await
    }

    async fn list_bundle_events(
        &self,
        bundle_id: Option<String>,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Event>, usize), StoreError> {
        self.inner.list_bundle_events(bundle_id, offset, limit).await
    }
}
