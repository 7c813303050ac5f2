//! Repository for the `refresh_tokens` table.

use notekeep_core::types::DbId;
use sqlx::PgConnection;

use crate::models::refresh_token::{CreateRefreshToken, RefreshToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, issued_at, expires_at, remember_me, revoked";

/// Provides persistence for hashed refresh tokens.
pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    /// Insert a new refresh token, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateRefreshToken,
    ) -> Result<RefreshToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO refresh_tokens (user_id, token_hash, issued_at, expires_at, remember_me)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.issued_at)
            .bind(input.expires_at)
            .bind(input.remember_me)
            .fetch_one(conn)
            .await
    }

    /// Find a usable token by hash and lock it for rotation.
    ///
    /// Only returns tokens that are not revoked and not expired.
    pub async fn find_valid_by_hash_for_update(
        conn: &mut PgConnection,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM refresh_tokens
             WHERE token_hash = $1
               AND revoked = false
               AND expires_at > NOW()
             FOR UPDATE"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(token_hash)
            .fetch_optional(conn)
            .await
    }

    /// Find a token by hash regardless of state.
    pub async fn find_by_hash(
        conn: &mut PgConnection,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM refresh_tokens WHERE token_hash = $1");
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(token_hash)
            .fetch_optional(conn)
            .await
    }

    /// Revoke a single token. Returns `true` if the row was updated.
    pub async fn revoke(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET revoked = true WHERE id = $1 AND revoked = false")
                .bind(id)
                .execute(conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every live token of a user. Returns the number revoked.
    pub async fn revoke_all_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = true WHERE user_id = $1 AND revoked = false",
        )
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete tokens that are expired or revoked. Returns the number deleted.
    pub async fn cleanup_expired(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW() OR revoked = true")
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }
}
