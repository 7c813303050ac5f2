//! Share-token rules: expiry resolution and consumption checks.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default lifetime of a share link when the caller specifies nothing.
pub const DEFAULT_SHARE_TTL_HOURS: i64 = 24;

/// What a share link grants. Only read access exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SharePermission {
    Read,
}

impl SharePermission {
    pub fn as_str(self) -> &'static str {
        match self {
            SharePermission::Read => "READ",
        }
    }
}

/// Resolve the expiry of a new share token.
///
/// - `no_expiry == Some(true)` wins and yields `None`.
/// - An explicit `expires_at` is used as-is but must lie in the future.
/// - Otherwise the token expires `default_ttl` from `now`.
pub fn resolve_expiry(
    no_expiry: Option<bool>,
    expires_at: Option<Timestamp>,
    now: Timestamp,
    default_ttl: Duration,
) -> Result<Option<Timestamp>, CoreError> {
    if no_expiry == Some(true) {
        return Ok(None);
    }
    match expires_at {
        Some(at) if at <= now => Err(CoreError::Validation(
            "expires_at must be in the future".into(),
        )),
        Some(at) => Ok(Some(at)),
        None => Ok(Some(now + default_ttl)),
    }
}

/// Check that a looked-up, non-revoked token can still be consumed.
pub fn ensure_consumable(
    expires_at: Option<Timestamp>,
    note_deleted: bool,
    now: Timestamp,
) -> Result<(), CoreError> {
    if expires_at.is_some_and(|at| at <= now) {
        return Err(CoreError::invalid_bearer_token());
    }
    if note_deleted {
        return Err(CoreError::NotFoundByKey {
            entity: "SharedNote",
            key: "shared note is no longer available".into(),
        });
    }
    Ok(())
}

/// Guard for issuing a share link.
pub fn ensure_shareable(note_deleted: bool) -> Result<(), CoreError> {
    if note_deleted {
        return Err(CoreError::InvalidOperation(
            "A note in the trash cannot be shared".into(),
        ));
    }
    Ok(())
}
