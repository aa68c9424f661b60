use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::{print_json, Command};
use crate::auth::{CallerIdentity, IdentityResolver, RequestContext, StaticIdentityResolver};
use crate::concurrency::compute_etag;
use crate::config::BundleApiConfig;
use crate::datasets::{InMemoryDatasets, Version};
use crate::error::BundleResult;
use crate::models::{Bundle, BundlePayload, ContentItem, Event, State};
use crate::service::BundleService;
use crate::store::InMemoryDatastore;

/// Records loaded into the in-memory collaborators
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub caller: Option<CallerIdentity>,
    /// Access tokens accepted by `--token`
    #[serde(default)]
    pub identities: HashMap<String, CallerIdentity>,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    #[serde(default)]
    pub content_items: Vec<ContentItem>,
    #[serde(default)]
    pub versions: Vec<Version>,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    bundle: Bundle,
    content_items: Vec<ContentItem>,
    versions: Vec<Version>,
    events: Vec<Event>,
}

pub struct SimulateCommand {
    config: BundleApiConfig,
    fixture: PathBuf,
    bundle_id: String,
    state: State,
    if_match: Option<String>,
    token: Option<String>,
}

impl SimulateCommand {
    pub fn new(config: BundleApiConfig, fixture: PathBuf, bundle_id: String, state: State) -> Self {
        Self {
            config,
            fixture,
            bundle_id,
            state,
            if_match: None,
            token: None,
        }
    }

    pub fn with_if_match(mut self, if_match: Option<String>) -> Self {
        self.if_match = if_match;
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    async fn resolve_caller(&self, fixture: &Fixture) -> Result<CallerIdentity> {
        let Some(token) = &self.token else {
            return Ok(fixture
                .caller
                .clone()
                .unwrap_or_else(|| CallerIdentity::new("simulator", "simulator@localhost")));
        };

        let resolver = fixture
            .identities
            .iter()
            .fold(StaticIdentityResolver::new(), |resolver, (token, identity)| {
                resolver.with_identity(token.clone(), identity.clone())
            });
        resolver
            .caller_identity(token)
            .await
            .context("failed to resolve caller from token")
    }

    fn load_fixture(&self) -> Result<Fixture> {
        let raw = std::fs::read_to_string(&self.fixture)
            .with_context(|| format!("failed to read fixture {}", self.fixture.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse fixture {}", self.fixture.display()))
    }

    async fn transition(&self, service: &BundleService, ctx: &RequestContext) -> BundleResult<Bundle> {
        let current = service.get_bundle(&self.bundle_id).await?;
        let if_match = self.if_match.clone().unwrap_or_else(|| current.e_tag.clone());

        let mut payload = BundlePayload::from(&current);
        payload.state = Some(self.state);
        service
            .update_bundle(ctx, &self.bundle_id, Some(&if_match), &payload)
            .await
    }
}

impl Command for SimulateCommand {
    async fn execute(&self) -> Result<()> {
        let fixture = self.load_fixture()?;
        let caller = self.resolve_caller(&fixture).await?;

        let store = Arc::new(InMemoryDatastore::new());
        for mut bundle in fixture.bundles {
            if bundle.e_tag.is_empty() {
                bundle.e_tag = compute_etag(&bundle, "")?;
            }
            store.seed_bundle(bundle).await;
        }
        for item in fixture.content_items {
            store.seed_content_item(item).await;
        }
        let datasets = Arc::new(InMemoryDatasets::with_versions(fixture.versions));

        let service = BundleService::new(store.clone(), datasets.clone(), &self.config);
        let ctx = RequestContext::new(caller);

        let result = self.transition(&service, &ctx).await;

        match result {
            Ok(bundle) => {
                let content_items = store
                    .content_items()
                    .await
                    .into_iter()
                    .filter(|item| item.bundle_id == bundle.id)
                    .collect();
                print_json(&SimulationReport {
                    bundle,
                    content_items,
                    versions: datasets.versions().await,
                    events: store.events().await,
                })
            }
            Err(err) => {
                print_json(&err.to_response())?;
                anyhow::bail!("simulation failed with status {}: {err}", err.status_code())
            }
        }
    }
}
