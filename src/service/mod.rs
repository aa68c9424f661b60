//! Bundle service: the operations a transport layer exposes
//!
//! Each operation validates and guards first, then mutates through the
//! [`Datastore`], and records an audit event once the mutation is committed.

mod bundles;
mod contents;

use std::sync::Arc;

use crate::audit::EventLog;
use crate::config::{BundleApiConfig, ServiceConfig};
use crate::datasets::DatasetsClient;
use crate::error::{BundleError, BundleResult, ErrorSource};
use crate::models::{Event, Page};
use crate::state_machine::{CascadeEngine, StateMachine, TransitionTable};
use crate::store::{Datastore, StoreError};

pub struct BundleService {
    store: Arc<dyn Datastore>,
    datasets: Arc<dyn DatasetsClient>,
    state_machine: StateMachine,
    events: EventLog,
    config: ServiceConfig,
}

impl BundleService {
    /// Service running the default bundle lifecycle
    pub fn new(
        store: Arc<dyn Datastore>,
        datasets: Arc<dyn DatasetsClient>,
        config: &BundleApiConfig,
    ) -> Self {
        Self::with_table(store, datasets, TransitionTable::bundle_lifecycle(), config)
    }

    pub fn with_table(
        store: Arc<dyn Datastore>,
        datasets: Arc<dyn DatasetsClient>,
        table: TransitionTable,
        config: &BundleApiConfig,
    ) -> Self {
        let events = EventLog::new(store.clone());
        let engine = CascadeEngine::new(store.clone(), datasets.clone(), events.clone());
        Self {
            store,
            datasets,
            state_machine: StateMachine::new(table, engine),
            events,
            config: config.service.clone(),
        }
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.state_machine
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Audit events, oldest first, optionally for one bundle only
    pub async fn list_events(
        &self,
        bundle_id: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> BundleResult<Page<Event>> {
        let limit = self.config.page_limit(limit);
        let (events, total) = self
            .store
            .list_bundle_events(bundle_id.map(str::to_string), offset, limit)
            .await
            .map_err(|e| BundleError::internal("failed to list events", e))?;
        Ok(Page::new(events, offset, limit, total))
    }
}

/// Map a datastore failure onto the service taxonomy
fn store_error(description: &str, err: StoreError) -> BundleError {
    match err {
        StoreError::BundleNotFound(id) => BundleError::not_found(format!("bundle not found: {id}")),
        StoreError::ContentItemNotFound(id) => {
            BundleError::not_found(format!("content item not found: {id}"))
        }
        StoreError::EtagMismatch { id } => BundleError::conflict_at(
            format!("etag does not match the current version of bundle {id}"),
            ErrorSource::header(crate::concurrency::IF_MATCH_HEADER),
        ),
        StoreError::Duplicate(what) => BundleError::conflict(format!("{what} already exists")),
        other => BundleError::internal(description, other),
    }
}
