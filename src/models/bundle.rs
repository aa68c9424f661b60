use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleType {
    Manual,
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PreviewTeam {
    pub id: String,
}

/// A release package whose content items are published together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: String,
    pub bundle_type: BundleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<User>,
    #[serde(default)]
    pub preview_teams: Vec<PreviewTeam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub state: State,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub e_tag: String,
}

impl Bundle {
    /// Resource path used in audit events
    pub fn path(&self) -> String {
        bundle_path(&self.id)
    }

    pub fn preview_team_ids(&self) -> BTreeSet<&str> {
        self.preview_teams.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn is_published(&self) -> bool {
        self.state == State::Published
    }
}

pub fn bundle_path(bundle_id: &str) -> String {
    format!("/bundles/{bundle_id}")
}

/// Caller-supplied bundle fields, validated before they become a `Bundle`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundlePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bundle_type: Option<BundleType>,
    #[serde(default)]
    pub state: Option<State>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub preview_teams: Option<Vec<PreviewTeam>>,
}

impl From<&Bundle> for BundlePayload {
    fn from(bundle: &Bundle) -> Self {
        Self {
            title: Some(bundle.title.clone()),
            bundle_type: Some(bundle.bundle_type),
            state: Some(bundle.state),
            scheduled_at: bundle.scheduled_at,
            preview_teams: Some(bundle.preview_teams.clone()),
        }
    }
}
