//! Note entity model, DTOs and views.

use std::collections::HashMap;

use notekeep_core::lifecycle::{BulkAction, NoteState};
use notekeep_core::types::{DbId, Timestamp};
use notekeep_core::validation::{validate_color, validate_not_blank, validate_tag_names};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::tag::Tag;

/// Maximum note body length in characters.
pub const MAX_CONTENT_LEN: u64 = 100_000;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct Note {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub color: Option<String>,
    pub owner: String,
    pub deleted: bool,
    pub deleted_by: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_by: Option<String>,
    pub updated_at: Timestamp,
    /// Optimistic-lock counter, bumped on every update.
    pub version: i64,
}

impl Note {
    pub fn state(&self) -> NoteState {
        NoteState::from_deleted_flag(self.deleted)
    }
}

// ---------------------------------------------------------------------------
// Repository DTOs
// ---------------------------------------------------------------------------

/// DTO for inserting a note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub color: Option<String>,
    pub owner: String,
}

/// Full set of user-editable fields written by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub color: Option<String>,
}

impl NoteChanges {
    /// Start from the current values of `note`.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            pinned: note.pinned,
            color: note.color.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Request body for `POST /api/notes` and `PUT /api/notes/{id}`.
///
/// On update, `tags: None` keeps the current tags; `Some(vec![])` clears them.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NoteRequest {
    #[validate(
        length(min = 1, max = 255, message = "title must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 100000, message = "content is limited to 100000 characters"))]
    pub content: String,
    #[serde(default)]
    pub pinned: bool,
    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
    #[validate(custom(function = "validate_tag_names"))]
    pub tags: Option<Vec<String>>,
}

/// Request body for `PATCH /api/notes/{id}`. Only provided fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NotePatchRequest {
    #[validate(
        length(min = 1, max = 255, message = "title must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(max = 100000, message = "content is limited to 100000 characters"))]
    pub content: Option<String>,
    pub pinned: Option<bool>,
    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
    #[validate(custom(function = "validate_tag_names"))]
    pub tags: Option<Vec<String>>,
}

impl NotePatchRequest {
    /// Overlay the provided fields onto `current`.
    pub fn apply_to(&self, current: NoteChanges) -> NoteChanges {
        NoteChanges {
            title: self
                .title
                .as_ref()
                .map(|t| t.trim().to_string())
                .unwrap_or(current.title),
            content: self.content.clone().unwrap_or(current.content),
            pinned: self.pinned.unwrap_or(current.pinned),
            color: self.color.clone().or(current.color),
        }
    }
}

/// Request body for `POST /api/notes/bulk`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkRequest {
    pub action: BulkAction,
    #[serde(default)]
    #[validate(length(max = 100, message = "at most 100 ids per bulk request"))]
    pub ids: Vec<DbId>,
}

/// Request body for `PUT /api/admin/notes/{id}/owner`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeOwnerRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub username: String,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A note with its tags resolved, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteView {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub color: Option<String>,
    pub owner: String,
    pub tags: Vec<String>,
    pub deleted: bool,
    pub deleted_by: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_by: Option<String>,
    pub updated_at: Timestamp,
    pub version: i64,
}

impl NoteView {
    pub fn new(note: Note, tags: Vec<Tag>) -> Self {
        let mut tags: Vec<String> = tags.into_iter().map(|t| t.name).collect();
        tags.sort();
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            pinned: note.pinned,
            color: note.color,
            owner: note.owner,
            tags,
            deleted: note.deleted,
            deleted_by: note.deleted_by,
            deleted_at: note.deleted_at,
            created_by: note.created_by,
            created_at: note.created_at,
            updated_by: note.updated_by,
            updated_at: note.updated_at,
            version: note.version,
        }
    }

    /// Pair each note with its tags from a `note_id -> tags` map.
    pub fn assemble(notes: Vec<Note>, mut tags: HashMap<DbId, Vec<Tag>>) -> Vec<Self> {
        notes
            .into_iter()
            .map(|n| {
                let t = tags.remove(&n.id).unwrap_or_default();
                Self::new(n, t)
            })
            .collect()
    }

    pub fn snapshot(&self) -> NoteSnapshot {
        NoteSnapshot {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            pinned: self.pinned,
            color: self.color.clone(),
            owner: self.owner.clone(),
            deleted: self.deleted,
            tags: self.tags.clone(),
            version: self.version,
        }
    }
}

/// Field values of a note at one point in time, stored as JSONB in
/// `note_revisions.snapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSnapshot {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub color: Option<String>,
    pub owner: String,
    pub deleted: bool,
    pub tags: Vec<String>,
    pub version: i64,
}

/// Read-only view served to share-link holders. Omits ownership and audit data.
#[derive(Debug, Clone, Serialize)]
pub struct SharedNoteView {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub color: Option<String>,
    pub tags: Vec<String>,
    pub updated_at: Timestamp,
}

impl From<NoteView> for SharedNoteView {
    fn from(view: NoteView) -> Self {
        Self {
            id: view.id,
            title: view.title,
            content: view.content,
            color: view.color,
            tags: view.tags,
            updated_at: view.updated_at,
        }
    }
}
