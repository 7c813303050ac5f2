//! Repository for the `notes` table.
//!
//! Every lifecycle transition is a single conditional statement on the
//! `deleted` flag. Single-note variants return the affected-row count; batch
//! variants return the ids that actually changed state.

use notekeep_core::note_filter::{NoteFilter, NoteSort};
use notekeep_core::paging::PageRequest;
use notekeep_core::types::DbId;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::models::note::{NewNote, Note, NoteChanges};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, content, pinned, color, owner, deleted, deleted_by, deleted_at, \
                       created_by, created_at, updated_by, updated_at, version";

/// Provides CRUD and lifecycle operations for notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a new active note, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &NewNote,
        actor: &str,
    ) -> Result<Note, sqlx::Error> {
        let query = format!(
            "INSERT INTO notes (title, content, pinned, color, owner, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.pinned)
            .bind(&input.color)
            .bind(&input.owner)
            .bind(actor)
            .fetch_one(conn)
            .await
    }

    /// Find a note by id regardless of its deleted flag.
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = $1");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find an active (not soft-deleted) note by id.
    pub async fn find_active(conn: &mut PgConnection, id: DbId) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = $1 AND deleted = false");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Load several notes by id in one round trip, in id order.
    pub async fn find_many(conn: &mut PgConnection, ids: &[DbId]) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Note>(&query)
            .bind(ids)
            .fetch_all(conn)
            .await
    }

    /// Return `(id, deleted)` for each of `ids` that exists, locking the rows
    /// until the surrounding transaction ends.
    ///
    /// When `owner` is given, notes belonging to anybody else are left out as
    /// if they did not exist. Rows are locked in id order so two batches over
    /// overlapping ids cannot deadlock.
    pub async fn find_states(
        conn: &mut PgConnection,
        ids: &[DbId],
        owner: Option<&str>,
    ) -> Result<Vec<(DbId, bool)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, bool)>(
            "SELECT id, deleted FROM notes
             WHERE id = ANY($1) AND ($2::text IS NULL OR owner = $2)
             ORDER BY id
             FOR UPDATE",
        )
        .bind(ids)
        .bind(owner)
        .fetch_all(conn)
        .await
    }

    /// Filtered, sorted, paginated listing. Returns the page and the total count.
    ///
    /// Pinned notes always sort first; `sort` decides the order within each group.
    pub async fn search(
        conn: &mut PgConnection,
        filters: &[NoteFilter],
        sort: NoteSort,
        page: PageRequest,
    ) -> Result<(Vec<Note>, i64), sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM notes n");
        push_filters(&mut count, filters);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM notes n"));
        push_filters(&mut select, filters);
        select
            .push(" ORDER BY n.pinned DESC, n.")
            .push(sort.field.column())
            .push(" ")
            .push(sort.direction.keyword())
            .push(" NULLS LAST, n.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let notes = select
            .build_query_as::<Note>()
            .fetch_all(&mut *conn)
            .await?;

        Ok((notes, total))
    }

    /// Overwrite the editable fields of an active note and bump its version.
    ///
    /// Returns `None` if the note does not exist or is soft-deleted.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        changes: &NoteChanges,
        actor: &str,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET
                title = $2,
                content = $3,
                pinned = $4,
                color = $5,
                updated_by = $6,
                version = version + 1
             WHERE id = $1 AND deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.content)
            .bind(changes.pinned)
            .bind(&changes.color)
            .bind(actor)
            .fetch_optional(conn)
            .await
    }

    /// Reassign an active note to another owner.
    pub async fn change_owner(
        conn: &mut PgConnection,
        id: DbId,
        new_owner: &str,
        actor: &str,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET owner = $2, updated_by = $3, version = version + 1
             WHERE id = $1 AND deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(new_owner)
            .bind(actor)
            .fetch_optional(conn)
            .await
    }

    /// Soft-delete an active note. Returns the number of rows affected (0 or 1).
    pub async fn soft_delete(
        conn: &mut PgConnection,
        id: DbId,
        actor: &str,
    ) -> Result<u64, sqlx::Error> {
        let changed = Self::soft_delete_many(conn, &[id], actor).await?;
        Ok(changed.len() as u64)
    }

    /// Soft-delete every active note in `ids` with one statement. Returns the
    /// ids that actually changed.
    pub async fn soft_delete_many(
        conn: &mut PgConnection,
        ids: &[DbId],
        actor: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "UPDATE notes SET
                deleted = true,
                deleted_by = $2,
                deleted_at = NOW(),
                updated_by = $2,
                version = version + 1
             WHERE id = ANY($1) AND deleted = false
             RETURNING id",
        )
        .bind(ids)
        .bind(actor)
        .fetch_all(conn)
        .await
    }

    /// Restore a soft-deleted note, clearing the deletion audit fields.
    pub async fn restore(conn: &mut PgConnection, id: DbId, actor: &str) -> Result<u64, sqlx::Error> {
        let changed = Self::restore_many(conn, &[id], actor).await?;
        Ok(changed.len() as u64)
    }

    /// Restore every soft-deleted note in `ids` with one statement. Returns
    /// the ids that actually changed.
    pub async fn restore_many(
        conn: &mut PgConnection,
        ids: &[DbId],
        actor: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "UPDATE notes SET
                deleted = false,
                deleted_by = NULL,
                deleted_at = NULL,
                updated_by = $2,
                version = version + 1
             WHERE id = ANY($1) AND deleted = true
             RETURNING id",
        )
        .bind(ids)
        .bind(actor)
        .fetch_all(conn)
        .await
    }

    /// Hard-delete a note that is already in the trash.
    pub async fn purge(conn: &mut PgConnection, id: DbId) -> Result<u64, sqlx::Error> {
        let purged = Self::purge_many(conn, &[id]).await?;
        Ok(purged.len() as u64)
    }

    /// Hard-delete every trashed note in `ids`. Tag links cascade. Returns the
    /// ids that were removed.
    pub async fn purge_many(conn: &mut PgConnection, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "DELETE FROM notes WHERE id = ANY($1) AND deleted = true RETURNING id",
        )
        .bind(ids)
        .fetch_all(conn)
        .await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Append `WHERE f1 AND f2 ...` for the given predicates. No predicates, no clause.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &[NoteFilter]) {
    for (i, filter) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            NoteFilter::NotDeleted => {
                qb.push("n.deleted = false");
            }
            NoteFilter::Deleted => {
                qb.push("n.deleted = true");
            }
            NoteFilter::TextContains(needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                qb.push("(LOWER(n.title) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\' OR LOWER(n.content) LIKE ")
                    .push_bind(pattern)
                    .push(" ESCAPE '\\')");
            }
            NoteFilter::ColorEquals(color) => {
                qb.push("n.color = ").push_bind(color.clone());
            }
            NoteFilter::Pinned(pinned) => {
                qb.push("n.pinned = ").push_bind(*pinned);
            }
            NoteFilter::HasTag(tag) => {
                qb.push(
                    "EXISTS (SELECT 1 FROM note_tags nt JOIN tags t ON t.id = nt.tag_id \
                     WHERE nt.note_id = n.id AND t.name = ",
                )
                .push_bind(tag.clone())
                .push(")");
            }
            NoteFilter::OwnedBy(owner) => {
                qb.push("n.owner = ").push_bind(owner.clone());
            }
        }
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
