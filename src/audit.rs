// Append-only audit log. Callers record an event only after their own
// mutation has been committed.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

use crate::auth::RequestContext;
use crate::error::{BundleError, BundleResult};
use crate::models::{Action, Bundle, ContentItem, Event, EventSubject};
use crate::store::Datastore;

#[derive(Clone)]
pub struct EventLog {
    store: Arc<dyn Datastore>,
}

impl EventLog {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    pub async fn record_bundle(
        &self,
        ctx: &RequestContext,
        action: Action,
        bundle: &Bundle,
    ) -> BundleResult<Event> {
        self.append(ctx, action, bundle.path(), EventSubject::Bundle(bundle.clone()))
            .await
    }

    pub async fn record_content_item(
        &self,
        ctx: &RequestContext,
        action: Action,
        item: &ContentItem,
    ) -> BundleResult<Event> {
        self.append(ctx, action, item.path(), EventSubject::ContentItem(item.clone()))
            .await
    }

    async fn append(
        &self,
        ctx: &RequestContext,
        action: Action,
        resource: String,
        subject: EventSubject,
    ) -> BundleResult<Event> {
        let event = Event {
            created_at: Utc::now(),
            requested_by: ctx.caller.requested_by(),
            action,
            resource,
            subject,
        };

        self.store.create_bundle_event(&event).await.map_err(|e| {
            error!(
                resource = %event.resource,
                correlation.id = %ctx.correlation_id,
                error = %e,
                "Failed to append audit event"
            );
            BundleError::internal("failed to create event", e)
        })?;

        debug!(
            resource = %event.resource,
            action = ?event.action,
            correlation.id = %ctx.correlation_id,
            "Audit event appended"
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CallerIdentity;
    use crate::models::{BundleType, State};
    use crate::store::InMemoryDatastore;

    #[tokio::test]
    async fn test_record_bundle_event() {
        let store = Arc::new(InMemoryDatastore::new());
        let log = EventLog::new(store.clone());
        let ctx = RequestContext::new(CallerIdentity::new("user-1", "publisher@example.com"));

        let bundle = Bundle {
            id: "b-1".to_string(),
            bundle_type: BundleType::Manual,
            created_by: None,
            created_at: None,
            last_updated_by: None,
            preview_teams: vec![],
            scheduled_at: None,
            state: State::Draft,
            title: "Release".to_string(),
            updated_at: None,
            e_tag: "etag".to_string(),
        };

        let event = log.record_bundle(&ctx, Action::Update, &bundle).await.unwrap();
        assert_eq!(event.resource, "/bundles/b-1");
        assert_eq!(event.requested_by.email, "publisher@example.com");

        let stored = store.events().await;
        assert_eq!(stored, vec![event]);

        let value = serde_json::to_value(&stored[0]).unwrap();
        assert_eq!(value["action"], "UPDATE");
        assert_eq!(value["bundle"]["id"], "b-1");
        assert!(value.get("content_item").is_none());
    }
}
