// Caller identity - used only to attribute audit events and bundle edits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{RequestedBy, User};
use crate::telemetry::generate_correlation_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: String,
    pub email: String,
}

impl CallerIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    pub fn requested_by(&self) -> RequestedBy {
        RequestedBy {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }

    pub fn as_user(&self) -> User {
        User {
            email: self.email.clone(),
        }
    }
}

/// Per-request data threaded through every operation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub caller: CallerIdentity,
    pub correlation_id: String,
}

impl RequestContext {
    pub fn new(caller: CallerIdentity) -> Self {
        Self {
            caller,
            correlation_id: generate_correlation_id(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorisation token")]
    MissingToken,
    #[error("authorisation token not recognised")]
    InvalidToken,
}

/// Resolves the identity behind a request's access token
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn caller_identity(&self, token: &str) -> Result<CallerIdentity, AuthError>;
}

/// Token table resolver for local runs and tests
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityResolver {
    identities: HashMap<String, CallerIdentity>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: impl Into<String>, identity: CallerIdentity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn caller_identity(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.identities
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_resolver_strips_bearer_prefix() {
        let resolver = StaticIdentityResolver::new()
            .with_identity("token-1", CallerIdentity::new("user-1", "publisher@example.com"));

        let identity = resolver.caller_identity("Bearer token-1").await.unwrap();
        assert_eq!(identity.email, "publisher@example.com");

        assert_eq!(
            resolver.caller_identity("").await.unwrap_err(),
            AuthError::MissingToken
        );
        assert_eq!(
            resolver.caller_identity("other").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
