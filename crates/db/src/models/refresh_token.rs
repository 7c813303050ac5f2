//! Refresh token model and DTOs.

use notekeep_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `refresh_tokens` table. The raw token is never stored.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub remember_me: bool,
    pub revoked: bool,
}

/// DTO for persisting a newly issued refresh token.
#[derive(Debug)]
pub struct CreateRefreshToken {
    pub user_id: DbId,
    pub token_hash: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub remember_me: bool,
}
