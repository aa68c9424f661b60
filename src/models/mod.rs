//! Bundle, content item and audit event records

pub mod bundle;
pub mod content_item;
pub mod event;
pub mod state;

pub use bundle::{bundle_path, Bundle, BundlePayload, BundleType, PreviewTeam, User};
pub use content_item::{
    content_item_path, ContentItem, ContentItemPayload, ContentLinks, ContentLinksPayload,
    ContentMetadata, ContentMetadataPayload, ContentType, VersionKey,
};
pub use event::{Action, Event, EventSubject, RequestedBy};
pub use state::{State, UnknownState};

use serde::{Deserialize, Serialize};

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, offset: usize, limit: usize, total_count: usize) -> Self {
        Self {
            count: items.len(),
            items,
            offset,
            limit,
            total_count,
        }
    }
}
