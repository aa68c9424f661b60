use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use super::{store_error, BundleService};
use crate::auth::RequestContext;
use crate::concurrency::check_precondition;
use crate::error::{BundleError, BundleResult, ErrorSource};
use crate::models::{Action, Bundle, BundlePayload, Page, State};
use crate::telemetry::create_request_span;
use crate::validation::{validate_bundle_payload, BundleFields};

fn fields_changed(bundle: &Bundle, fields: &BundleFields) -> bool {
    bundle.title != fields.title
        || bundle.bundle_type != fields.bundle_type
        || bundle.scheduled_at != fields.scheduled_at
        || bundle.preview_team_ids() != fields
            .preview_teams
            .iter()
            .map(|t| t.id.as_str())
            .collect::<BTreeSet<_>>()
}

impl BundleService {
    pub async fn create_bundle(&self, ctx: &RequestContext, payload: &BundlePayload) -> BundleResult<Bundle> {
        let span = create_request_span("create_bundle", None, &ctx.correlation_id);

        async move {
            let fields = validate_bundle_payload(payload, None, Utc::now())?;
            if let Some(state) = fields.state {
                if state != State::Draft {
                    return Err(BundleError::invalid_field(
                        "/state",
                        "bundles can only be created in the DRAFT state",
                    ));
                }
            }
            self.ensure_title_available(&fields.title, None).await?;

            let now = Utc::now();
            let user = ctx.caller.as_user();
            let bundle = Bundle {
                id: Uuid::new_v4().to_string(),
                bundle_type: fields.bundle_type,
                created_by: Some(user.clone()),
                created_at: Some(now),
                last_updated_by: Some(user),
                preview_teams: fields.preview_teams,
                scheduled_at: fields.scheduled_at,
                state: State::Draft,
                title: fields.title,
                updated_at: Some(now),
                e_tag: String::new(),
            };

            let stored = self
                .store
                .create_bundle(&bundle)
                .await
                .map_err(|e| store_error("failed to create bundle", e))?;
            self.events.record_bundle(ctx, Action::Create, &stored).await?;

            info!(bundle.id = %stored.id, "Bundle created");
            Ok(stored)
        }
        .instrument(span)
        .await
    }

    pub async fn get_bundle(&self, id: &str) -> BundleResult<Bundle> {
        self.store
            .get_bundle(id)
            .await
            .map_err(|e| store_error("failed to get bundle", e))
    }

    pub async fn list_bundles(&self, offset: usize, limit: usize) -> BundleResult<Page<Bundle>> {
        let limit = self.config.page_limit(limit);
        let (bundles, total) = self
            .store
            .list_bundles(offset, limit)
            .await
            .map_err(|e| store_error("failed to list bundles", e))?;
        Ok(Page::new(bundles, offset, limit, total))
    }

    /// Replace a bundle's editable fields, moving it through the lifecycle when
    /// the requested state differs from the stored one.
    ///
    /// The state change commits first (with its own UPDATE event), then the
    /// remaining fields are written with a compare-and-swap on the fingerprint
    /// the transition produced.
    pub async fn update_bundle(
        &self,
        ctx: &RequestContext,
        id: &str,
        if_match: Option<&str>,
        payload: &BundlePayload,
    ) -> BundleResult<Bundle> {
        let span = create_request_span("update_bundle", Some(id), &ctx.correlation_id);

        async move {
            let current = self.get_bundle(id).await?;
            check_precondition(if_match, &current)?;

            let fields = validate_bundle_payload(payload, Some(&current), Utc::now())?;
            let target = fields
                .state
                .ok_or_else(|| BundleError::missing_field("/state"))?;

            let edits = fields_changed(&current, &fields);
            if edits {
                // Edits never land on a published bundle, including one this request publishes
                if current.is_published() || target == State::Published {
                    return Err(BundleError::conflict(format!(
                        "bundle {id} is published and cannot be edited"
                    )));
                }
                if current.title != fields.title {
                    self.ensure_title_available(&fields.title, Some(id)).await?;
                }
            }

            let mut bundle = current;
            if target != bundle.state {
                bundle = self
                    .state_machine
                    .transition(ctx, &bundle, target)
                    .await?
                    .bundle;
            }

            if !edits {
                debug!(bundle.id = %id, "No field edits to apply");
                return Ok(bundle);
            }

            let expected_etag = bundle.e_tag.clone();
            let replacement = Bundle {
                title: fields.title,
                bundle_type: fields.bundle_type,
                scheduled_at: fields.scheduled_at,
                preview_teams: fields.preview_teams,
                last_updated_by: Some(ctx.caller.as_user()),
                updated_at: Some(Utc::now()),
                ..bundle
            };

            let stored = self
                .store
                .update_bundle(id, &replacement, &expected_etag)
                .await
                .map_err(|e| store_error("failed to update bundle", e))?;
            self.events.record_bundle(ctx, Action::Update, &stored).await?;

            info!(bundle.id = %id, "Bundle updated");
            Ok(stored)
        }
        .instrument(span)
        .await
    }

    /// Remove an unpublished bundle and its content items
    pub async fn delete_bundle(&self, ctx: &RequestContext, id: &str) -> BundleResult<()> {
        let span = create_request_span("delete_bundle", Some(id), &ctx.correlation_id);

        async move {
            let bundle = self.get_bundle(id).await?;
            if bundle.is_published() {
                return Err(BundleError::conflict(format!(
                    "bundle {id} is published and cannot be deleted"
                )));
            }

            self.store
                .delete_bundle(id)
                .await
                .map_err(|e| store_error("failed to delete bundle", e))?;
            self.events.record_bundle(ctx, Action::Delete, &bundle).await?;

            info!(bundle.id = %id, "Bundle deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn ensure_title_available(&self, title: &str, exclude_id: Option<&str>) -> BundleResult<()> {
        let taken = self
            .store
            .check_bundle_exists_by_title(title, exclude_id.map(str::to_string))
            .await
            .map_err(|e| store_error("failed to check bundle title", e))?;
        if taken {
            return Err(BundleError::conflict_at(
                "a bundle with the same title already exists",
                ErrorSource::field("/title"),
            ));
        }
        Ok(())
    }
}
