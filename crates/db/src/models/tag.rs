//! Tag models.

use notekeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tags` table. `name` is always normalized.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// A tag joined to the note that references it.
#[derive(Debug, Clone, FromRow)]
pub struct NoteTagRow {
    pub note_id: DbId,
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

impl From<NoteTagRow> for Tag {
    fn from(row: NoteTagRow) -> Self {
        Tag {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Tag plus the number of active notes using it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagUsage {
    pub id: DbId,
    pub name: String,
    pub usage_count: i64,
}

/// Query parameters for `GET /api/tags/suggest`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagSuggestParams {
    /// Prefix matched against normalized tag names.
    #[serde(default)]
    pub prefix: String,
    /// Maximum suggestions. Defaults to 10.
    pub limit: Option<i64>,
}

/// Default number of tag suggestions.
pub const DEFAULT_SUGGEST_LIMIT: i64 = 10;
/// Upper bound on tag suggestions per request.
pub const MAX_SUGGEST_LIMIT: i64 = 50;

impl TagSuggestParams {
    /// Requested limit, clamped to `1..=MAX_SUGGEST_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SUGGEST_LIMIT)
            .clamp(1, MAX_SUGGEST_LIMIT)
    }
}
