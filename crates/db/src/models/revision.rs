//! Note revision history models.

use notekeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::note::NoteSnapshot;

/// Kind of change a revision records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevisionType {
    /// The note was created.
    Add,
    /// The note was modified (including soft delete and restore).
    Mod,
    /// The note was purged.
    Del,
}

impl RevisionType {
    pub fn as_str(self) -> &'static str {
        match self {
            RevisionType::Add => "ADD",
            RevisionType::Mod => "MOD",
            RevisionType::Del => "DEL",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ADD" => Some(RevisionType::Add),
            "MOD" => Some(RevisionType::Mod),
            "DEL" => Some(RevisionType::Del),
            _ => None,
        }
    }
}

/// A row from the `note_revisions` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRevision {
    pub rev: DbId,
    pub note_id: DbId,
    pub revision_type: String,
    pub revised_at: Timestamp,
    pub revised_by: Option<String>,
    pub snapshot: Json<NoteSnapshot>,
}

/// API representation of one revision.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionView {
    pub revision_number: DbId,
    pub revision_type: RevisionType,
    pub revised_at: Timestamp,
    pub revised_by: Option<String>,
    pub note: NoteSnapshot,
}

impl From<NoteRevision> for RevisionView {
    fn from(row: NoteRevision) -> Self {
        Self {
            revision_number: row.rev,
            // The CHECK constraint only admits the three known values.
            revision_type: RevisionType::parse(&row.revision_type).unwrap_or(RevisionType::Mod),
            revised_at: row.revised_at,
            revised_by: row.revised_by,
            note: row.snapshot.0,
        }
    }
}
