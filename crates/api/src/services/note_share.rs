//! Share links: issuance, consumption and revocation.
//!
//! Only the SHA-256 of a share token is stored. The raw token is returned once
//! from [`create`] and afterwards only ever arrives from a link holder.

use chrono::Utc;
use notekeep_core::access::{ensure_edit_access, Principal};
use notekeep_core::error::CoreError;
use notekeep_core::paging::{Page, PageRequest};
use notekeep_core::share::{ensure_consumable, ensure_shareable, resolve_expiry, SharePermission};
use notekeep_core::tokens::{generate_token, hash_token};
use notekeep_core::types::DbId;
use notekeep_db::models::note::SharedNoteView;
use notekeep_db::models::share_token::{
    CreateShareRequest, CreateShareToken, CreatedShareToken, ShareToken, ShareTokenView,
};
use notekeep_db::repositories::{NoteRepo, ShareTokenRepo};
use notekeep_db::DbPool;
use sqlx::PgConnection;

use crate::error::AppResult;
use crate::services::note_access::{editable_note, view_of};
use crate::uow::UnitOfWork;

/// Issue a share link for a note the principal owns.
pub async fn create(
    uow: &mut UnitOfWork,
    principal: &Principal,
    note_id: DbId,
    input: CreateShareRequest,
    default_ttl: chrono::Duration,
) -> AppResult<CreatedShareToken> {
    let note = editable_note(uow.conn(), principal, note_id).await?;
    ensure_shareable(note.deleted)?;

    let expires_at = resolve_expiry(input.no_expiry, input.expires_at, Utc::now(), default_ttl)?;
    let token = generate_token();

    let row = ShareTokenRepo::create(
        uow.conn(),
        &CreateShareToken {
            note_id,
            permission: SharePermission::Read,
            token_hash: token.hash,
            expires_at,
            one_time: input.one_time,
            created_by: principal.username.clone(),
        },
    )
    .await?;

    tracing::info!(
        note_id,
        share_id = row.id,
        one_time = row.one_time,
        user = %principal.username,
        "Share link created"
    );
    Ok(CreatedShareToken {
        token: token.plaintext,
        share: row.into(),
    })
}

/// Resolve a raw share token to the shared note and count the use.
///
/// Runs in its own transaction, committed before returning. The token row is
/// locked for the duration, so of two concurrent consumers of a one-time
/// token exactly one succeeds.
pub async fn consume(pool: &DbPool, raw_token: &str) -> AppResult<SharedNoteView> {
    if raw_token.trim().is_empty() {
        return Err(CoreError::invalid_bearer_token().into());
    }
    let token_hash = hash_token(raw_token);

    let mut tx = pool.begin().await?;

    let token = ShareTokenRepo::find_active_by_hash_for_update(&mut tx, &token_hash)
        .await?
        .ok_or_else(CoreError::invalid_bearer_token)?;

    let note = NoteRepo::find_by_id(&mut tx, token.note_id)
        .await?
        .ok_or_else(|| CoreError::note_not_found(token.note_id))?;
    ensure_consumable(token.expires_at, note.deleted, Utc::now())?;

    let used = ShareTokenRepo::record_use(&mut tx, token.id, token.one_time).await?;
    let view = view_of(&mut tx, note).await?;

    tx.commit().await?;

    tracing::info!(
        share_id = used.id,
        note_id = used.note_id,
        use_count = used.use_count,
        revoked = used.revoked,
        "Share link consumed"
    );
    Ok(view.into())
}

/// Share links of a note the principal owns, newest first.
pub async fn list_for_note(
    conn: &mut PgConnection,
    principal: &Principal,
    note_id: DbId,
) -> AppResult<Vec<ShareTokenView>> {
    editable_note(conn, principal, note_id).await?;
    let rows = ShareTokenRepo::list_for_note(conn, note_id).await?;
    Ok(rows.into_iter().map(ShareTokenView::from).collect())
}

/// Revoke one link of a note the principal owns. Idempotent.
pub async fn revoke_for_note(
    uow: &mut UnitOfWork,
    principal: &Principal,
    note_id: DbId,
    token_id: DbId,
) -> AppResult<()> {
    let token = load_token(uow.conn(), token_id).await?;
    if token.note_id != note_id {
        return Err(share_not_found(token_id).into());
    }
    let note = NoteRepo::find_by_id(uow.conn(), note_id)
        .await?
        .ok_or_else(|| CoreError::note_not_found(note_id))?;
    ensure_edit_access(Some(principal), &note.owner)?;

    revoke(uow.conn(), principal, token_id).await
}

/// Every share link in the system. Admin only.
pub async fn list_all(
    conn: &mut PgConnection,
    page: PageRequest,
) -> AppResult<Page<ShareTokenView>> {
    let (rows, total) = ShareTokenRepo::list_all(conn, page).await?;
    let items = rows.into_iter().map(ShareTokenView::from).collect();
    Ok(Page::new(items, page, total))
}

/// Revoke any share link by id. Admin only. Idempotent.
pub async fn revoke_any(
    uow: &mut UnitOfWork,
    admin: &Principal,
    token_id: DbId,
) -> AppResult<()> {
    load_token(uow.conn(), token_id).await?;
    revoke(uow.conn(), admin, token_id).await
}

async fn revoke(conn: &mut PgConnection, principal: &Principal, token_id: DbId) -> AppResult<()> {
    if ShareTokenRepo::revoke(conn, token_id).await? {
        tracing::info!(share_id = token_id, user = %principal.username, "Share link revoked");
    } else {
        tracing::debug!(share_id = token_id, "Share link already revoked");
    }
    Ok(())
}

async fn load_token(conn: &mut PgConnection, token_id: DbId) -> AppResult<ShareToken> {
    ShareTokenRepo::find_by_id(conn, token_id)
        .await?
        .ok_or_else(|| share_not_found(token_id).into())
}

fn share_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "ShareToken",
        id,
    }
}
