//! Optimistic concurrency for bundle mutations
//!
//! A bundle's `e_tag` is a SHA-256 over the previous fingerprint and the bundle's
//! canonical JSON (with `e_tag` cleared). Chaining the previous value means a bump
//! after a child mutation changes the fingerprint even when no bundle field moved.

use sha2::{Digest, Sha256};

use crate::error::{BundleError, BundleResult};
use crate::models::Bundle;

pub const IF_MATCH_HEADER: &str = "If-Match";

pub fn compute_etag(bundle: &Bundle, previous: &str) -> Result<String, serde_json::Error> {
    let mut canonical = bundle.clone();
    canonical.e_tag.clear();
    let body = serde_json::to_vec(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(previous.as_bytes());
    hasher.update(b"\n");
    hasher.update(&body);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Strip the weak prefix and quotes a client may send back verbatim
pub fn normalize_if_match(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix("W/").unwrap_or(value);
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Reject the mutation unless the caller holds the current fingerprint
pub fn check_precondition(if_match: Option<&str>, stored: &Bundle) -> BundleResult<()> {
    let supplied = match if_match.map(normalize_if_match) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(BundleError::missing_header(IF_MATCH_HEADER)),
    };

    if supplied != stored.e_tag {
        tracing::warn!(
            bundle.id = %stored.id,
            "If-Match does not match the stored e_tag"
        );
        return Err(BundleError::conflict(format!(
            "etag does not match the current version of bundle {}",
            stored.id
        )));
    }
    Ok(())
}
