//! Repository for the `tags` and `note_tags` tables.

use std::collections::HashMap;

use notekeep_core::types::DbId;
use sqlx::PgConnection;

use crate::models::tag::{NoteTagRow, Tag, TagUsage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at";

/// Provides tag lookup, creation and note association.
pub struct TagRepo;

impl TagRepo {
    /// Find existing tags whose normalized name is in `names`.
    pub async fn find_by_names(
        conn: &mut PgConnection,
        names: &[String],
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = ANY($1)");
        sqlx::query_as::<_, Tag>(&query)
            .bind(names)
            .fetch_all(conn)
            .await
    }

    /// Insert every name in `names` that does not exist yet and return the
    /// newly created rows. Names created concurrently by another transaction
    /// are skipped rather than raising a conflict.
    pub async fn create_missing(
        conn: &mut PgConnection,
        names: &[String],
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (name)
             SELECT UNNEST($1::text[])
             ON CONFLICT ON CONSTRAINT uq_tags_name DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(names)
            .fetch_all(conn)
            .await
    }

    /// Replace the full tag set of a note.
    pub async fn set_note_tags(
        conn: &mut PgConnection,
        note_id: DbId,
        tag_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM note_tags WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut *conn)
            .await?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO note_tags (note_id, tag_id)
             SELECT $1, UNNEST($2::bigint[])
             ON CONFLICT DO NOTHING",
        )
        .bind(note_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Tags of one note ordered by name.
    pub async fn tags_for_note(
        conn: &mut PgConnection,
        note_id: DbId,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.name, t.created_at
             FROM tags t
             JOIN note_tags nt ON nt.tag_id = t.id
             WHERE nt.note_id = $1
             ORDER BY t.name",
        )
        .bind(note_id)
        .fetch_all(conn)
        .await
    }

    /// Tags for a batch of notes, grouped by note id. Notes without tags are
    /// absent from the map.
    pub async fn tags_for_notes(
        conn: &mut PgConnection,
        note_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<Tag>>, sqlx::Error> {
        if note_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, NoteTagRow>(
            "SELECT nt.note_id, t.id, t.name, t.created_at
             FROM note_tags nt
             JOIN tags t ON t.id = nt.tag_id
             WHERE nt.note_id = ANY($1)
             ORDER BY nt.note_id, t.name",
        )
        .bind(note_ids)
        .fetch_all(conn)
        .await?;

        let mut grouped: HashMap<DbId, Vec<Tag>> = HashMap::new();
        for row in rows {
            grouped.entry(row.note_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    /// Delete every tag no note references. Returns the number removed.
    pub async fn delete_orphans(conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tags t
             WHERE NOT EXISTS (SELECT 1 FROM note_tags nt WHERE nt.tag_id = t.id)",
        )
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Tag names starting with `prefix`, restricted to tags on `owner`'s active
    /// notes when an owner is given.
    pub async fn suggest(
        conn: &mut PgConnection,
        prefix: &str,
        owner: Option<&str>,
        limit: i64,
    ) -> Result<Vec<String>, sqlx::Error> {
        let pattern = format!("{}%", escape_prefix(prefix));
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT t.name
             FROM tags t
             WHERE t.name LIKE $1 ESCAPE '\\'
               AND ($2::text IS NULL OR EXISTS (
                    SELECT 1 FROM note_tags nt
                    JOIN notes n ON n.id = nt.note_id
                    WHERE nt.tag_id = t.id AND n.owner = $2 AND n.deleted = false))
             ORDER BY t.name
             LIMIT $3",
        )
        .bind(pattern)
        .bind(owner)
        .bind(limit)
        .fetch_all(conn)
        .await
    }

    /// Tags with the number of active notes using them, most used first.
    ///
    /// With an `owner`, only that owner's active notes are counted and unused
    /// tags are omitted.
    pub async fn list_with_usage(
        conn: &mut PgConnection,
        owner: Option<&str>,
    ) -> Result<Vec<TagUsage>, sqlx::Error> {
        sqlx::query_as::<_, TagUsage>(
            "SELECT t.id, t.name, COUNT(n.id) AS usage_count
             FROM tags t
             LEFT JOIN note_tags nt ON nt.tag_id = t.id
             LEFT JOIN notes n ON n.id = nt.note_id
                  AND n.deleted = false
                  AND ($1::text IS NULL OR n.owner = $1)
             GROUP BY t.id, t.name
             HAVING $1::text IS NULL OR COUNT(n.id) > 0
             ORDER BY usage_count DESC, t.name",
        )
        .bind(owner)
        .fetch_all(conn)
        .await
    }
}

fn escape_prefix(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
