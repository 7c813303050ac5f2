//! Read paths for notes: lookups by id and filtered listings.

use notekeep_core::access::{ensure_read_access, Principal};
use notekeep_core::note_filter::{compose_filters, NoteCriteria, NoteFilter, NoteSort, Visibility};
use notekeep_core::paging::{Page, PageRequest};
use notekeep_core::types::DbId;
use notekeep_db::models::note::NoteView;
use notekeep_db::repositories::{NoteRepo, TagRepo};
use sqlx::PgConnection;

use crate::cache::NoteCache;
use crate::error::AppResult;
use crate::services::note_access::{active_note, view_of};

/// Active note `id`, read through the cache.
pub async fn find_by_id(
    conn: &mut PgConnection,
    cache: &NoteCache,
    id: DbId,
) -> AppResult<NoteView> {
    if let Some(view) = cache.get(id).filter(|v| !v.deleted) {
        return Ok(view);
    }

    let ticket = cache.ticket();
    let note = active_note(conn, id).await?;
    let view = view_of(conn, note).await?;
    cache.fill(ticket, view.clone());
    Ok(view)
}

/// Active note `id` if the principal may read it.
pub async fn find_by_id_for_user(
    conn: &mut PgConnection,
    cache: &NoteCache,
    principal: &Principal,
    id: DbId,
) -> AppResult<NoteView> {
    let view = find_by_id(conn, cache, id).await?;
    ensure_read_access(Some(principal), &view.owner)?;
    Ok(view)
}

/// The principal's own notes, active or trashed. `criteria.owner` is ignored.
pub async fn list_own(
    conn: &mut PgConnection,
    principal: &Principal,
    visibility: Visibility,
    criteria: &NoteCriteria,
    sort: NoteSort,
    page: PageRequest,
) -> AppResult<Page<NoteView>> {
    let filters = compose_filters(visibility, Some(&principal.username), criteria);
    search(conn, &filters, sort, page).await
}

/// Notes of every owner, optionally narrowed by `criteria.owner`.
pub async fn list_all(
    conn: &mut PgConnection,
    visibility: Visibility,
    criteria: &NoteCriteria,
    sort: NoteSort,
    page: PageRequest,
) -> AppResult<Page<NoteView>> {
    let filters = compose_filters(visibility, None, criteria);
    search(conn, &filters, sort, page).await
}

async fn search(
    conn: &mut PgConnection,
    filters: &[NoteFilter],
    sort: NoteSort,
    page: PageRequest,
) -> AppResult<Page<NoteView>> {
    let (notes, total) = NoteRepo::search(conn, filters, sort, page).await?;
    let ids: Vec<DbId> = notes.iter().map(|n| n.id).collect();
    let tags = TagRepo::tags_for_notes(conn, &ids).await?;
    Ok(Page::new(NoteView::assemble(notes, tags), page, total))
}
