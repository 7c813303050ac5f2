//! Repository for the `note_share_tokens` table.

use notekeep_core::paging::PageRequest;
use notekeep_core::types::DbId;
use sqlx::PgConnection;

use crate::models::share_token::{CreateShareToken, ShareToken};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, note_id, permission, token_hash, expires_at, one_time, use_count, \
                       revoked, created_by, created_at";

/// Provides issuance, consumption and revocation of share tokens.
pub struct ShareTokenRepo;

impl ShareTokenRepo {
    /// Insert a new share token, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateShareToken,
    ) -> Result<ShareToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO note_share_tokens
                (note_id, permission, token_hash, expires_at, one_time, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(input.note_id)
            .bind(input.permission.as_str())
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .bind(input.one_time)
            .bind(&input.created_by)
            .fetch_one(conn)
            .await
    }

    /// Find a non-revoked token by hash and lock its row until the surrounding
    /// transaction ends. Concurrent consumers of the same token queue here.
    pub async fn find_active_by_hash_for_update(
        conn: &mut PgConnection,
        token_hash: &str,
    ) -> Result<Option<ShareToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM note_share_tokens
             WHERE token_hash = $1 AND revoked = false
             FOR UPDATE"
        );
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(token_hash)
            .fetch_optional(conn)
            .await
    }

    /// Count one use of a token, revoking it in the same statement when
    /// `revoke` is set.
    pub async fn record_use(
        conn: &mut PgConnection,
        id: DbId,
        revoke: bool,
    ) -> Result<ShareToken, sqlx::Error> {
        let query = format!(
            "UPDATE note_share_tokens
             SET use_count = use_count + 1, revoked = revoked OR $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(id)
            .bind(revoke)
            .fetch_one(conn)
            .await
    }

    /// Find a token by id, revoked or not.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ShareToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM note_share_tokens WHERE id = $1");
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// All tokens of a note, newest first.
    pub async fn list_for_note(
        conn: &mut PgConnection,
        note_id: DbId,
    ) -> Result<Vec<ShareToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM note_share_tokens WHERE note_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ShareToken>(&query)
            .bind(note_id)
            .fetch_all(conn)
            .await
    }

    /// One page of every token in the system, newest first, plus the total.
    pub async fn list_all(
        conn: &mut PgConnection,
        page: PageRequest,
    ) -> Result<(Vec<ShareToken>, i64), sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM note_share_tokens")
            .fetch_one(&mut *conn)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM note_share_tokens
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, ShareToken>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        Ok((rows, total))
    }

    /// Revoke a token. Returns `true` if it was active before the call;
    /// revoking an already-revoked token is a no-op.
    pub async fn revoke(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE note_share_tokens SET revoked = true WHERE id = $1 AND revoked = false",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
