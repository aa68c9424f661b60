use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Bundle, ContentItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedBy {
    pub id: String,
    pub email: String,
}

/// Snapshot carried by an event; exactly one kind per record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubject {
    Bundle(Bundle),
    ContentItem(ContentItem),
}

/// Immutable audit record for one committed mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub created_at: DateTime<Utc>,
    pub requested_by: RequestedBy,
    pub action: Action,
    pub resource: String,
    #[serde(flatten)]
    pub subject: EventSubject,
}

impl Event {
    /// Id of the bundle the event concerns, whichever snapshot it carries
    pub fn bundle_id(&self) -> &str {
        match &self.subject {
            EventSubject::Bundle(bundle) => &bundle.id,
            EventSubject::ContentItem(item) => &item.bundle_id,
        }
    }
}
