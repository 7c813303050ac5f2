//! Note mutations.
//!
//! Every successful mutation appends a revision and defers a cache eviction
//! for the touched note. Lifecycle: Active -> SoftDeleted -> Purged, with
//! restore moving SoftDeleted back to Active.

use notekeep_core::access::{ensure_edit_access, Principal};
use notekeep_core::error::CoreError;
use notekeep_core::lifecycle::{
    ensure_purgeable, plan_bulk, validate_bulk_ids, BulkAction, BulkResult, NoteState,
};
use notekeep_core::types::DbId;
use notekeep_core::validation::normalize_username;
use notekeep_db::models::note::{
    BulkRequest, ChangeOwnerRequest, NewNote, Note, NoteChanges, NotePatchRequest, NoteRequest,
    NoteView,
};
use notekeep_db::models::revision::RevisionType;
use notekeep_db::models::tag::Tag;
use notekeep_db::repositories::{NoteRepo, RevisionRepo, TagRepo, UserRepo};
use sqlx::PgConnection;
use validator::Validate;

use crate::error::AppResult;
use crate::services::note_access::{any_note, editable_active_note, editable_note, view_of};
use crate::services::tag_resolver::{removes_any, resolve_tags};
use crate::uow::{Effect, UnitOfWork};

/// Create a note owned by the principal.
pub async fn create(
    uow: &mut UnitOfWork,
    principal: &Principal,
    input: NoteRequest,
) -> AppResult<NoteView> {
    input.validate()?;

    let new_note = NewNote {
        title: input.title.trim().to_string(),
        content: input.content,
        pinned: input.pinned,
        color: input.color,
        owner: principal.username.clone(),
    };
    let note = NoteRepo::create(uow.conn(), &new_note, &principal.username).await?;

    let tags = resolve_tags(uow.conn(), input.tags.as_deref().unwrap_or_default()).await?;
    let tag_ids: Vec<DbId> = tags.iter().map(|t| t.id).collect();
    TagRepo::set_note_tags(uow.conn(), note.id, &tag_ids).await?;

    let view = NoteView::new(note, tags);
    record(uow, principal, &view, RevisionType::Add).await?;

    tracing::info!(note_id = view.id, user = %principal.username, "Note created");
    Ok(view)
}

/// Replace the editable fields of an active note. `tags: None` keeps the tags.
pub async fn update(
    uow: &mut UnitOfWork,
    principal: &Principal,
    id: DbId,
    input: NoteRequest,
) -> AppResult<NoteView> {
    input.validate()?;

    let changes = NoteChanges {
        title: input.title.trim().to_string(),
        content: input.content,
        pinned: input.pinned,
        color: input.color,
    };
    let view = apply_changes(uow, principal, id, |_| changes, input.tags.as_deref()).await?;

    tracing::info!(note_id = id, user = %principal.username, "Note updated");
    Ok(view)
}

/// Overwrite only the provided fields of an active note.
pub async fn patch(
    uow: &mut UnitOfWork,
    principal: &Principal,
    id: DbId,
    input: NotePatchRequest,
) -> AppResult<NoteView> {
    input.validate()?;

    let view = apply_changes(
        uow,
        principal,
        id,
        |note| input.apply_to(NoteChanges::from_note(note)),
        input.tags.as_deref(),
    )
    .await?;

    tracing::info!(note_id = id, user = %principal.username, "Note patched");
    Ok(view)
}

/// Move an active note to the trash.
pub async fn soft_delete(uow: &mut UnitOfWork, principal: &Principal, id: DbId) -> AppResult<()> {
    let note = any_note(uow.conn(), id).await?;
    ensure_edit_access(Some(principal), &note.owner)?;

    let affected = NoteRepo::soft_delete(uow.conn(), id, &principal.username).await?;
    if affected == 0 {
        return Err(CoreError::note_not_found(id).into());
    }

    let note = any_note(uow.conn(), id).await?;
    let view = view_of(uow.conn(), note).await?;
    record(uow, principal, &view, RevisionType::Mod).await?;

    tracing::info!(note_id = id, user = %principal.username, "Note moved to trash");
    Ok(())
}

/// Bring a trashed note back.
pub async fn restore(
    uow: &mut UnitOfWork,
    principal: &Principal,
    id: DbId,
) -> AppResult<NoteView> {
    editable_note(uow.conn(), principal, id).await?;

    let affected = NoteRepo::restore(uow.conn(), id, &principal.username).await?;
    if affected == 0 {
        return Err(CoreError::note_not_found(id).into());
    }

    let note = any_note(uow.conn(), id).await?;
    let view = view_of(uow.conn(), note).await?;
    record(uow, principal, &view, RevisionType::Mod).await?;

    tracing::info!(note_id = id, user = %principal.username, "Note restored");
    Ok(view)
}

/// Hard-delete a note that is already in the trash.
pub async fn delete_permanently(
    uow: &mut UnitOfWork,
    principal: &Principal,
    id: DbId,
) -> AppResult<()> {
    let note = editable_note(uow.conn(), principal, id).await?;
    ensure_purgeable(id, note.state())?;

    let view = view_of(uow.conn(), note).await?;
    let affected = NoteRepo::purge(uow.conn(), id).await?;
    if affected == 0 {
        return Err(CoreError::note_not_found(id).into());
    }

    record(uow, principal, &view, RevisionType::Del).await?;
    uow.defer(Effect::PurgeOrphanTags);

    tracing::info!(note_id = id, user = %principal.username, "Note permanently deleted");
    Ok(())
}

/// Apply one lifecycle action to a set of notes.
///
/// Ids that do not exist, belong to someone else (unless the principal is an
/// admin) or are in the wrong state land in `failed_ids`. The action runs as
/// one statement over the eligible rest.
pub async fn bulk(
    uow: &mut UnitOfWork,
    principal: &Principal,
    input: BulkRequest,
) -> AppResult<BulkResult> {
    input.validate()?;
    validate_bulk_ids(&input.ids)?;
    if input.ids.is_empty() {
        return Ok(BulkResult::default());
    }

    let owner_scope = (!principal.is_admin()).then_some(principal.username.as_str());
    let found: Vec<(DbId, NoteState)> = NoteRepo::find_states(uow.conn(), &input.ids, owner_scope)
        .await?
        .into_iter()
        .map(|(id, deleted)| (id, NoteState::from_deleted_flag(deleted)))
        .collect();

    let plan = plan_bulk(input.action, &input.ids, &found);
    let mut result = BulkResult {
        processed_count: 0,
        failed_ids: plan.failed,
    };
    if plan.eligible.is_empty() {
        return Ok(result);
    }

    let actor = principal.username.as_str();
    let changed = match input.action {
        BulkAction::DeleteSoft => {
            let changed = NoteRepo::soft_delete_many(uow.conn(), &plan.eligible, actor).await?;
            let views = load_views(uow.conn(), &changed).await?;
            record_all(uow, principal, &views, RevisionType::Mod).await?;
            changed
        }
        BulkAction::Restore => {
            let changed = NoteRepo::restore_many(uow.conn(), &plan.eligible, actor).await?;
            let views = load_views(uow.conn(), &changed).await?;
            record_all(uow, principal, &views, RevisionType::Mod).await?;
            changed
        }
        BulkAction::DeleteForever => {
            let mut views = load_views(uow.conn(), &plan.eligible).await?;
            let purged = NoteRepo::purge_many(uow.conn(), &plan.eligible).await?;
            views.retain(|v| purged.contains(&v.id));
            record_all(uow, principal, &views, RevisionType::Del).await?;
            if !purged.is_empty() {
                uow.defer(Effect::PurgeOrphanTags);
            }
            purged
        }
    };

    // Eligible rows that the statement skipped changed state underneath us.
    result.processed_count = changed.len() as u64;
    result.failed_ids.extend(
        plan.eligible
            .iter()
            .copied()
            .filter(|id| !changed.contains(id)),
    );

    tracing::info!(
        action = input.action.as_str(),
        processed = result.processed_count,
        failed = result.failed_ids.len(),
        user = %principal.username,
        "Bulk note action applied"
    );
    Ok(result)
}

/// Reassign an active note to another user. Admin only.
pub async fn change_owner(
    uow: &mut UnitOfWork,
    admin: &Principal,
    id: DbId,
    input: ChangeOwnerRequest,
) -> AppResult<NoteView> {
    if !admin.is_admin() {
        return Err(CoreError::Forbidden("Admin role required".into()).into());
    }
    input.validate()?;

    let username = normalize_username(&input.username);
    let user = UserRepo::find_by_username(uow.conn(), &username)
        .await?
        .ok_or_else(|| CoreError::user_not_found(&username))?;

    let note = NoteRepo::change_owner(uow.conn(), id, &user.username, &admin.username)
        .await?
        .ok_or_else(|| CoreError::note_not_found(id))?;

    let view = view_of(uow.conn(), note).await?;
    record(uow, admin, &view, RevisionType::Mod).await?;

    tracing::info!(note_id = id, new_owner = %user.username, admin = %admin.username, "Note owner changed");
    Ok(view)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Shared body of update and patch.
async fn apply_changes(
    uow: &mut UnitOfWork,
    principal: &Principal,
    id: DbId,
    build: impl FnOnce(&Note) -> NoteChanges,
    tag_names: Option<&[String]>,
) -> AppResult<NoteView> {
    let note = editable_active_note(uow.conn(), principal, id).await?;
    let changes = build(&note);

    let updated = NoteRepo::update(uow.conn(), id, &changes, &principal.username)
        .await?
        .ok_or_else(|| CoreError::note_not_found(id))?;

    let tags = match tag_names {
        Some(names) => replace_tags(uow, id, names).await?,
        None => TagRepo::tags_for_note(uow.conn(), id).await?,
    };

    let view = NoteView::new(updated, tags);
    record(uow, principal, &view, RevisionType::Mod).await?;
    Ok(view)
}

/// Replace a note's tags, scheduling an orphan sweep when any were dropped.
pub(crate) async fn replace_tags(
    uow: &mut UnitOfWork,
    note_id: DbId,
    names: &[String],
) -> AppResult<Vec<Tag>> {
    let before: Vec<String> = TagRepo::tags_for_note(uow.conn(), note_id)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();

    let tags = resolve_tags(uow.conn(), names).await?;
    let tag_ids: Vec<DbId> = tags.iter().map(|t| t.id).collect();
    TagRepo::set_note_tags(uow.conn(), note_id, &tag_ids).await?;

    if removes_any(&before, &tags) {
        uow.defer(Effect::PurgeOrphanTags);
    }
    Ok(tags)
}

/// Append a revision for `view` and defer its cache eviction.
pub(crate) async fn record(
    uow: &mut UnitOfWork,
    principal: &Principal,
    view: &NoteView,
    revision_type: RevisionType,
) -> AppResult<()> {
    RevisionRepo::record(uow.conn(), revision_type, &view.snapshot(), &principal.username).await?;
    uow.defer(Effect::EvictNote(view.id));
    Ok(())
}

async fn load_views(conn: &mut PgConnection, ids: &[DbId]) -> AppResult<Vec<NoteView>> {
    let notes = NoteRepo::find_many(conn, ids).await?;
    let tags = TagRepo::tags_for_notes(conn, ids).await?;
    Ok(NoteView::assemble(notes, tags))
}

/// Record a revision for each view.
async fn record_all(
    uow: &mut UnitOfWork,
    principal: &Principal,
    views: &[NoteView],
    revision_type: RevisionType,
) -> AppResult<()> {
    for view in views {
        record(uow, principal, view, revision_type).await?;
    }
    Ok(())
}
