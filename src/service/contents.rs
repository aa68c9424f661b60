use tracing::{info, warn, Instrument};

use super::{store_error, BundleService};
use crate::auth::RequestContext;
use crate::datasets::DatasetsError;
use crate::error::{BundleError, BundleResult, ErrorSource};
use crate::models::{Action, ContentItem, ContentItemPayload, Page, State};
use crate::telemetry::create_request_span;
use crate::validation::validate_content_item_payload;

fn datasets_lookup_error(err: DatasetsError) -> BundleError {
    match err {
        DatasetsError::DatasetNotFound { .. } => BundleError::not_found_at(
            "dataset not found",
            ErrorSource::field("/metadata/dataset_id"),
        ),
        DatasetsError::EditionNotFound { .. } => BundleError::not_found_at(
            "edition not found",
            ErrorSource::field("/metadata/edition_id"),
        ),
        DatasetsError::VersionNotFound { .. } => BundleError::not_found_at(
            "version not found",
            ErrorSource::field("/metadata/version_id"),
        ),
        other => BundleError::internal("failed to get version from datasets service", other),
    }
}

impl BundleService {
    /// Add a dataset version to a bundle.
    ///
    /// Returns the stored item and the owning bundle's new fingerprint.
    pub async fn create_content_item(
        &self,
        ctx: &RequestContext,
        bundle_id: &str,
        payload: &ContentItemPayload,
    ) -> BundleResult<(ContentItem, String)> {
        let span = create_request_span("create_content_item", Some(bundle_id), &ctx.correlation_id);

        async move {
            self.get_bundle(bundle_id).await?;

            let item = validate_content_item_payload(payload, bundle_id)?;
            let metadata = &item.metadata;

            self.datasets
                .get_version(&metadata.dataset_id, &metadata.edition_id, metadata.version_id)
                .await
                .map_err(|e| {
                    warn!(version = %item.version_key(), error = %e, "Version lookup failed");
                    datasets_lookup_error(e)
                })?;

            let exists = self
                .store
                .check_content_item_exists_by_dataset_edition_version(
                    &metadata.dataset_id,
                    &metadata.edition_id,
                    metadata.version_id,
                )
                .await
                .map_err(|e| store_error("failed to check content item", e))?;
            if exists {
                return Err(BundleError::conflict(format!(
                    "content item already exists for {}",
                    item.version_key()
                )));
            }

            self.store
                .create_content_item(&item)
                .await
                .map_err(|e| store_error("failed to create content item", e))?;
            self.events
                .record_content_item(ctx, Action::Create, &item)
                .await?;

            let bundle = self
                .store
                .update_bundle_etag(bundle_id, &ctx.caller.as_user())
                .await
                .map_err(|e| store_error("failed to update bundle etag", e))?;

            info!(bundle.id = %bundle_id, content_item.id = %item.id, "Content item created");
            Ok((item, bundle.e_tag))
        }
        .instrument(span)
        .await
    }

    pub async fn get_bundle_contents(
        &self,
        bundle_id: &str,
        offset: usize,
        limit: usize,
    ) -> BundleResult<Page<ContentItem>> {
        self.get_bundle(bundle_id).await?;

        let limit = self.config.page_limit(limit);
        let items = self
            .store
            .get_bundle_content_items(bundle_id)
            .await
            .map_err(|e| store_error("failed to get bundle contents", e))?;
        let total = items.len();
        let items = items.into_iter().skip(offset).take(limit).collect();
        Ok(Page::new(items, offset, limit, total))
    }

    /// Set one content item's state directly. PUBLISHED is only reachable
    /// through the bundle lifecycle.
    ///
    /// Returns the updated item and the owning bundle's new fingerprint.
    pub async fn update_content_item_state(
        &self,
        ctx: &RequestContext,
        bundle_id: &str,
        content_item_id: &str,
        state: State,
    ) -> BundleResult<(ContentItem, String)> {
        let span = create_request_span(
            "update_content_item_state",
            Some(bundle_id),
            &ctx.correlation_id,
        );

        async move {
            if state == State::Published {
                return Err(BundleError::invalid_field(
                    "/state",
                    "content items are published through their bundle",
                ));
            }

            let bundle = self.get_bundle(bundle_id).await?;
            if bundle.is_published() {
                return Err(BundleError::conflict(format!(
                    "bundle {bundle_id} is published and its contents cannot change"
                )));
            }

            let mut item = self
                .store
                .get_content_item(bundle_id, content_item_id)
                .await
                .map_err(|e| store_error("failed to get content item", e))?;

            self.store
                .update_bundle_content_item_state(content_item_id, state)
                .await
                .map_err(|e| store_error("failed to update content item state", e))?;
            item.state = Some(state);

            self.events
                .record_content_item(ctx, Action::Update, &item)
                .await?;

            let bundle = self
                .store
                .update_bundle_etag(bundle_id, &ctx.caller.as_user())
                .await
                .map_err(|e| store_error("failed to update bundle etag", e))?;

            info!(
                bundle.id = %bundle_id,
                content_item.id = %content_item_id,
                state = %state,
                "Content item state updated"
            );
            Ok((item, bundle.e_tag))
        }
        .instrument(span)
        .await
    }
}
