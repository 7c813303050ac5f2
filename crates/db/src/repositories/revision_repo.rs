//! Repository for the `note_revisions` table.
//!
//! Rows are append-only. There is no foreign key to `notes`, so the history of
//! a purged note remains readable.

use notekeep_core::paging::PageRequest;
use notekeep_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgConnection;

use crate::models::note::NoteSnapshot;
use crate::models::revision::{NoteRevision, RevisionType};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "rev, note_id, revision_type, revised_at, revised_by, snapshot";

/// Provides append and lookup for note history.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Append a revision for `snapshot.id`.
    pub async fn record(
        conn: &mut PgConnection,
        revision_type: RevisionType,
        snapshot: &NoteSnapshot,
        actor: &str,
    ) -> Result<NoteRevision, sqlx::Error> {
        let query = format!(
            "INSERT INTO note_revisions (note_id, revision_type, revised_by, snapshot)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NoteRevision>(&query)
            .bind(snapshot.id)
            .bind(revision_type.as_str())
            .bind(actor)
            .bind(Json(snapshot))
            .fetch_one(conn)
            .await
    }

    /// One page of a note's revisions, newest first, plus the total count.
    pub async fn list_for_note(
        conn: &mut PgConnection,
        note_id: DbId,
        page: PageRequest,
    ) -> Result<(Vec<NoteRevision>, i64), sqlx::Error> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM note_revisions WHERE note_id = $1")
                .bind(note_id)
                .fetch_one(&mut *conn)
                .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM note_revisions
             WHERE note_id = $1
             ORDER BY rev DESC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, NoteRevision>(&query)
            .bind(note_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *conn)
            .await?;

        Ok((rows, total))
    }

    /// Find one revision of a note by revision number.
    pub async fn find(
        conn: &mut PgConnection,
        note_id: DbId,
        rev: DbId,
    ) -> Result<Option<NoteRevision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM note_revisions WHERE note_id = $1 AND rev = $2");
        sqlx::query_as::<_, NoteRevision>(&query)
            .bind(note_id)
            .bind(rev)
            .fetch_optional(conn)
            .await
    }
}
