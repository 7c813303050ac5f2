//! Note share-token models and DTOs.

use notekeep_core::share::SharePermission;
use notekeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `note_share_tokens` table. Only the token hash is stored.
#[derive(Debug, Clone, FromRow)]
pub struct ShareToken {
    pub id: DbId,
    pub note_id: DbId,
    pub permission: String,
    pub token_hash: String,
    pub expires_at: Option<Timestamp>,
    pub one_time: bool,
    pub use_count: i32,
    pub revoked: bool,
    pub created_by: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a share token.
#[derive(Debug)]
pub struct CreateShareToken {
    pub note_id: DbId,
    pub permission: SharePermission,
    pub token_hash: String,
    pub expires_at: Option<Timestamp>,
    pub one_time: bool,
    pub created_by: String,
}

/// Request body for `POST /api/notes/{id}/share`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateShareRequest {
    pub expires_at: Option<Timestamp>,
    pub no_expiry: Option<bool>,
    #[serde(default)]
    pub one_time: bool,
}

/// Share-token metadata as listed to owners and admins. Never carries the token.
#[derive(Debug, Clone, Serialize)]
pub struct ShareTokenView {
    pub id: DbId,
    pub note_id: DbId,
    pub permission: String,
    pub expires_at: Option<Timestamp>,
    pub one_time: bool,
    pub use_count: i32,
    pub revoked: bool,
    pub created_by: String,
    pub created_at: Timestamp,
}

impl From<ShareToken> for ShareTokenView {
    fn from(t: ShareToken) -> Self {
        Self {
            id: t.id,
            note_id: t.note_id,
            permission: t.permission,
            expires_at: t.expires_at,
            one_time: t.one_time,
            use_count: t.use_count,
            revoked: t.revoked,
            created_by: t.created_by,
            created_at: t.created_at,
        }
    }
}

/// Response to share-link creation: the only time the raw token is revealed.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedShareToken {
    pub token: String,
    #[serde(flatten)]
    pub share: ShareTokenView,
}
