//! Cascade engine: pushes a bundle's new state to its content items and to the
//! Datasets Service, then commits the bundle state and records the event.
//!
//! The cascade is sequential and non-atomic. Items are processed one at a time in
//! stored order; a hard failure stops the loop where it is and nothing already
//! written is undone, so the stored state shows exactly how far it got.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::audit::EventLog;
use crate::auth::RequestContext;
use crate::datasets::DatasetsClient;
use crate::concurrency::IF_MATCH_HEADER;
use crate::error::{BundleError, BundleResult, ErrorSource};
use crate::models::{Action, Bundle, ContentItem, State};
use crate::store::{Datastore, StoreError};

/// What a completed cascade did to each content item
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub bundle: Bundle,
    pub updated_items: Vec<String>,
    pub skipped_items: Vec<String>,
}

#[derive(Clone)]
pub struct CascadeEngine {
    store: Arc<dyn Datastore>,
    datasets: Arc<dyn DatasetsClient>,
    events: EventLog,
}

enum ItemOutcome {
    Updated,
    Skipped,
}

impl CascadeEngine {
    pub fn new(store: Arc<dyn Datastore>, datasets: Arc<dyn DatasetsClient>, events: EventLog) -> Self {
        Self {
            store,
            datasets,
            events,
        }
    }

    pub async fn content_items(&self, bundle_id: &str) -> BundleResult<Vec<ContentItem>> {
        self.store
            .get_bundle_content_items(bundle_id)
            .await
            .map_err(|e| BundleError::internal("failed to get bundle contents", e))
    }

    pub async fn cascade(
        &self,
        ctx: &RequestContext,
        bundle: &Bundle,
        target: State,
        items: &[ContentItem],
        requires_content: bool,
    ) -> BundleResult<TransitionOutcome> {
        if requires_content && items.is_empty() {
            return Err(BundleError::not_found(format!(
                "bundle has no content items: {}",
                bundle.id
            )));
        }

        let source = bundle.state;
        let mut updated_items = Vec::new();
        let mut skipped_items = Vec::new();

        for item in items {
            match self.cascade_item(item, source, target).await? {
                ItemOutcome::Updated => updated_items.push(item.id.clone()),
                ItemOutcome::Skipped => skipped_items.push(item.id.clone()),
            }
        }

        // Item writes leave the bundle fingerprint alone, so the e_tag the caller's
        // precondition matched must still be current when the state commits
        self.store
            .update_bundle_state(&bundle.id, target, &ctx.caller.as_user(), &bundle.e_tag)
            .await
            .map_err(|e| match e {
                StoreError::EtagMismatch { id } => {
                    warn!(bundle.id = %id, "Bundle changed while transitioning, state not committed");
                    BundleError::conflict_at(
                        format!("etag does not match the current version of bundle {id}"),
                        ErrorSource::header(IF_MATCH_HEADER),
                    )
                }
                other => {
                    // Fatal even though every item above already moved
                    error!(bundle.id = %bundle.id, error = %other, "Failed to update bundle state");
                    BundleError::internal("failed to update bundle state", other)
                }
            })?;

        let committed = self
            .store
            .get_bundle(&bundle.id)
            .await
            .map_err(|e| BundleError::internal("failed to read bundle after state update", e))?;

        self.events
            .record_bundle(ctx, Action::Update, &committed)
            .await?;

        info!(
            bundle.id = %bundle.id,
            state.from = %source,
            state.to = %target,
            updated = updated_items.len(),
            skipped = skipped_items.len(),
            "Bundle transition committed"
        );

        Ok(TransitionOutcome {
            bundle: committed,
            updated_items,
            skipped_items,
        })
    }

    async fn cascade_item(
        &self,
        item: &ContentItem,
        source: State,
        target: State,
    ) -> BundleResult<ItemOutcome> {
        let metadata = &item.metadata;

        if item.state != Some(source) {
            warn!(
                content_item.id = %item.id,
                content_item.state = ?item.state,
                bundle.state = %source,
                "Content item state does not match bundle state, skipping"
            );
            return Ok(ItemOutcome::Skipped);
        }

        let version = self
            .datasets
            .get_version(&metadata.dataset_id, &metadata.edition_id, metadata.version_id)
            .await
            .map_err(|e| {
                error!(content_item.id = %item.id, version = %item.version_key(), error = %e, "Failed to get version");
                BundleError::internal("failed to get version from datasets service", e)
            })?;

        if version.state != source {
            warn!(
                content_item.id = %item.id,
                version = %item.version_key(),
                version.state = %version.state,
                bundle.state = %source,
                "Version state does not match bundle state, skipping"
            );
            return Ok(ItemOutcome::Skipped);
        }

        self.datasets
            .set_version_state(
                &metadata.dataset_id,
                &metadata.edition_id,
                metadata.version_id,
                target,
            )
            .await
            .map_err(|e| {
                error!(content_item.id = %item.id, version = %item.version_key(), error = %e, "Failed to set version state");
                BundleError::internal("failed to update version state", e)
            })?;

        self.store
            .update_bundle_content_item_state(&item.id, target)
            .await
            .map_err(|e| {
                error!(content_item.id = %item.id, error = %e, "Failed to update content item state");
                BundleError::internal("failed to update content item state", e)
            })?;

        Ok(ItemOutcome::Updated)
    }
}
