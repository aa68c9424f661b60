// Payload validation - every failure points at the offending field

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{BundleError, BundleResult};
use crate::models::{
    Bundle, BundlePayload, BundleType, ContentItem, ContentItemPayload, ContentLinks,
    ContentMetadata, PreviewTeam, State,
};

/// Bundle fields that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct BundleFields {
    pub title: String,
    pub bundle_type: BundleType,
    pub state: Option<State>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub preview_teams: Vec<PreviewTeam>,
}

fn required_text(value: &Option<String>, pointer: &str) -> BundleResult<String> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(BundleError::missing_field(pointer)),
    }
}

/// Validate a create or replace body. `existing` is the stored bundle on replace.
pub fn validate_bundle_payload(
    payload: &BundlePayload,
    existing: Option<&Bundle>,
    now: DateTime<Utc>,
) -> BundleResult<BundleFields> {
    let title = required_text(&payload.title, "/title")?;
    let bundle_type = payload
        .bundle_type
        .ok_or_else(|| BundleError::missing_field("/bundle_type"))?;

    let preview_teams = match &payload.preview_teams {
        Some(teams) if !teams.is_empty() => teams,
        _ => return Err(BundleError::missing_field("/preview_teams")),
    };
    let mut normalized_teams = Vec::with_capacity(preview_teams.len());
    for (index, team) in preview_teams.iter().enumerate() {
        let id = team.id.trim();
        if id.is_empty() {
            return Err(BundleError::missing_field(&format!("/preview_teams/{index}/id")));
        }
        normalized_teams.push(PreviewTeam { id: id.to_string() });
    }

    match (bundle_type, payload.scheduled_at) {
        (BundleType::Scheduled, None) => {
            return Err(BundleError::missing_field("/scheduled_at"));
        }
        (BundleType::Manual, Some(_)) => {
            return Err(BundleError::invalid_field(
                "/scheduled_at",
                "scheduled_at should not be set for manual bundles",
            ));
        }
        (BundleType::Scheduled, Some(scheduled_at)) => {
            let unchanged = existing.and_then(|b| b.scheduled_at) == Some(scheduled_at);
            if scheduled_at < now && !unchanged {
                return Err(BundleError::invalid_field(
                    "/scheduled_at",
                    "scheduled_at cannot be in the past",
                ));
            }
        }
        (BundleType::Manual, None) => {}
    }

    Ok(BundleFields {
        title,
        bundle_type,
        state: payload.state,
        scheduled_at: payload.scheduled_at,
        preview_teams: normalized_teams,
    })
}

/// Validate a content item body and build the record to persist, with a fresh id
pub fn validate_content_item_payload(
    payload: &ContentItemPayload,
    bundle_id: &str,
) -> BundleResult<ContentItem> {
    let payload_bundle_id = required_text(&payload.bundle_id, "/bundle_id")?;
    if payload_bundle_id != bundle_id {
        return Err(BundleError::invalid_field(
            "/bundle_id",
            "bundle_id does not match the bundle in the request path",
        ));
    }

    let content_type = payload
        .content_type
        .ok_or_else(|| BundleError::missing_field("/content_type"))?;

    let dataset_id = required_text(&payload.metadata.dataset_id, "/metadata/dataset_id")?;
    let edition_id = required_text(&payload.metadata.edition_id, "/metadata/edition_id")?;
    let version_id = match payload.metadata.version_id {
        None => return Err(BundleError::missing_field("/metadata/version_id")),
        Some(v) => u32::try_from(v).ok().filter(|v| *v >= 1).ok_or_else(|| {
            BundleError::invalid_field(
                "/metadata/version_id",
                "version_id must be a positive integer",
            )
        })?,
    };
    let title = payload
        .metadata
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let edit = required_text(&payload.links.edit, "/links/edit")?;
    let preview = required_text(&payload.links.preview, "/links/preview")?;

    Ok(ContentItem {
        id: Uuid::new_v4().to_string(),
        bundle_id: bundle_id.to_string(),
        content_type,
        metadata: ContentMetadata {
            dataset_id,
            edition_id,
            title,
            version_id,
        },
        links: ContentLinks { edit, preview },
        state: None,
    })
}
