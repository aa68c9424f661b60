// Preconditions evaluated before any cascade write

use tracing::warn;

use crate::error::{BundleError, BundleResult};
use crate::models::{Bundle, ContentItem, State};

/// Reject approval unless every content item is already APPROVED
pub fn ensure_all_content_approved(bundle: &Bundle, items: &[ContentItem]) -> BundleResult<()> {
    let pending: Vec<&str> = items
        .iter()
        .filter(|item| item.state != Some(State::Approved))
        .map(|item| item.id.as_str())
        .collect();

    if !pending.is_empty() {
        warn!(
            bundle.id = %bundle.id,
            pending = ?pending,
            "Approval rejected, content items not approved"
        );
        return Err(BundleError::transition("not all bundle contents are approved"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BundleType, ContentLinks, ContentMetadata, ContentType};

    fn item(state: Option<State>) -> ContentItem {
        ContentItem {
            id: "c-1".to_string(),
            bundle_id: "b-1".to_string(),
            content_type: ContentType::Dataset,
            metadata: ContentMetadata {
                dataset_id: "cpih".to_string(),
                edition_id: "time-series".to_string(),
                title: None,
                version_id: 1,
            },
            links: ContentLinks {
                edit: "/edit".to_string(),
                preview: "/preview".to_string(),
            },
            state,
        }
    }

    fn bundle() -> Bundle {
        Bundle {
            id: "b-1".to_string(),
            bundle_type: BundleType::Manual,
            created_by: None,
            created_at: None,
            last_updated_by: None,
            preview_teams: vec![],
            scheduled_at: None,
            state: State::InReview,
            title: "Release".to_string(),
            updated_at: None,
            e_tag: String::new(),
        }
    }

    #[test]
    fn test_unapproved_or_unset_state_blocks_approval() {
        for state in [None, Some(State::Draft), Some(State::InReview), Some(State::Published)] {
            let err = ensure_all_content_approved(&bundle(), &[item(Some(State::Approved)), item(state)])
                .unwrap_err();
            assert_eq!(err.to_string(), "not all bundle contents are approved");
        }
    }

    #[test]
    fn test_all_approved_passes() {
        assert!(ensure_all_content_approved(&bundle(), &[item(Some(State::Approved))]).is_ok());
        assert!(ensure_all_content_approved(&bundle(), &[]).is_ok());
    }
}
