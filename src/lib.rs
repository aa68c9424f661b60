// Bundle API Library - dataset release bundles and their publishing lifecycle
// This exposes the core components for testing and integration

pub mod audit;
pub mod auth;
pub mod cli;
pub mod concurrency;
pub mod config;
pub mod datasets;
pub mod error;
pub mod models;
pub mod service;
pub mod state_machine;
pub mod store;
pub mod telemetry;
pub mod validation;

// Re-export key types for easy access
pub use audit::EventLog;
pub use auth::{CallerIdentity, IdentityResolver, RequestContext, StaticIdentityResolver};
pub use concurrency::{check_precondition, compute_etag};
pub use config::BundleApiConfig;
pub use datasets::{DatasetsClient, DatasetsError, InMemoryDatasets, Version};
pub use error::{BundleError, BundleResult, ErrorCode, ErrorResponse, ErrorSource};
pub use models::{Action, Bundle, BundleType, ContentItem, Event, Page, State};
pub use service::BundleService;
pub use state_machine::{CascadeEngine, HandlerTag, StateMachine, Transition, TransitionOutcome, TransitionTable};
pub use store::{Datastore, InMemoryDatastore, StoreError};
pub use telemetry::{create_request_span, create_transition_span, generate_correlation_id, init_telemetry};
