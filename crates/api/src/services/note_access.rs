//! Note loading with ownership checks, used by the mutating services.
//!
//! Everything here reads through the caller's connection and never touches
//! the cache, so uncommitted state cannot leak into it.

use notekeep_core::access::{ensure_edit_access, ensure_read_access, Principal};
use notekeep_core::error::CoreError;
use notekeep_core::types::DbId;
use notekeep_db::models::note::{Note, NoteView};
use notekeep_db::repositories::{NoteRepo, TagRepo};
use sqlx::PgConnection;

use crate::error::AppResult;

/// Attach tags to a loaded note.
pub async fn view_of(conn: &mut PgConnection, note: Note) -> AppResult<NoteView> {
    let tags = TagRepo::tags_for_note(conn, note.id).await?;
    Ok(NoteView::new(note, tags))
}

/// Active note `id`, or `NoteNotFound`.
pub async fn active_note(conn: &mut PgConnection, id: DbId) -> AppResult<Note> {
    NoteRepo::find_active(conn, id)
        .await?
        .ok_or_else(|| CoreError::note_not_found(id).into())
}

/// Note `id` in any state, or `NoteNotFound`.
pub async fn any_note(conn: &mut PgConnection, id: DbId) -> AppResult<Note> {
    NoteRepo::find_by_id(conn, id)
        .await?
        .ok_or_else(|| CoreError::note_not_found(id).into())
}

/// Active note the principal may edit.
pub async fn editable_active_note(
    conn: &mut PgConnection,
    principal: &Principal,
    id: DbId,
) -> AppResult<Note> {
    let note = active_note(conn, id).await?;
    ensure_edit_access(Some(principal), &note.owner)?;
    Ok(note)
}

/// Note in any state the principal may edit.
pub async fn editable_note(
    conn: &mut PgConnection,
    principal: &Principal,
    id: DbId,
) -> AppResult<Note> {
    let note = any_note(conn, id).await?;
    ensure_edit_access(Some(principal), &note.owner)?;
    Ok(note)
}

/// Note in any state the principal may read.
pub async fn readable_note(
    conn: &mut PgConnection,
    principal: &Principal,
    id: DbId,
) -> AppResult<Note> {
    let note = any_note(conn, id).await?;
    ensure_read_access(Some(principal), &note.owner)?;
    Ok(note)
}
