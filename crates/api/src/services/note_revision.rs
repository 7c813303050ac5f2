//! Note history: listing revisions and restoring a past snapshot.

use notekeep_core::access::Principal;
use notekeep_core::error::CoreError;
use notekeep_core::paging::{Page, PageRequest};
use notekeep_core::types::DbId;
use notekeep_db::models::note::{NoteChanges, NoteView};
use notekeep_db::models::revision::{NoteRevision, RevisionType, RevisionView};
use notekeep_db::repositories::{NoteRepo, RevisionRepo};
use sqlx::PgConnection;

use crate::error::AppResult;
use crate::services::note_access::{editable_active_note, readable_note};
use crate::services::note_command::{record, replace_tags};
use crate::uow::UnitOfWork;

/// Revisions of a note the principal may read, newest first.
pub async fn find_revisions(
    conn: &mut PgConnection,
    principal: &Principal,
    note_id: DbId,
    page: PageRequest,
) -> AppResult<Page<RevisionView>> {
    readable_note(conn, principal, note_id).await?;

    let (rows, total) = RevisionRepo::list_for_note(conn, note_id, page).await?;
    let items = rows.into_iter().map(RevisionView::from).collect();
    Ok(Page::new(items, page, total))
}

/// One revision of a note the principal may read.
pub async fn find_revision(
    conn: &mut PgConnection,
    principal: &Principal,
    note_id: DbId,
    rev: DbId,
) -> AppResult<RevisionView> {
    readable_note(conn, principal, note_id).await?;
    Ok(load_revision(conn, note_id, rev).await?.into())
}

/// Copy a past snapshot onto the live note.
///
/// Title, content, pinned, color and tags come from the snapshot. Owner and
/// deleted state stay as they are, and the restore itself becomes a new
/// revision.
pub async fn restore_revision(
    uow: &mut UnitOfWork,
    principal: &Principal,
    note_id: DbId,
    rev: DbId,
) -> AppResult<NoteView> {
    editable_active_note(uow.conn(), principal, note_id).await?;
    let snapshot = load_revision(uow.conn(), note_id, rev).await?.snapshot.0;

    let changes = NoteChanges {
        title: snapshot.title,
        content: snapshot.content,
        pinned: snapshot.pinned,
        color: snapshot.color,
    };
    let updated = NoteRepo::update(uow.conn(), note_id, &changes, &principal.username)
        .await?
        .ok_or_else(|| CoreError::note_not_found(note_id))?;

    let tags = replace_tags(uow, note_id, &snapshot.tags).await?;
    let view = NoteView::new(updated, tags);
    record(uow, principal, &view, RevisionType::Mod).await?;

    tracing::info!(note_id, rev, user = %principal.username, "Note restored from revision");
    Ok(view)
}

async fn load_revision(
    conn: &mut PgConnection,
    note_id: DbId,
    rev: DbId,
) -> AppResult<NoteRevision> {
    RevisionRepo::find(conn, note_id, rev)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Revision",
                id: rev,
            }
            .into()
        })
}
