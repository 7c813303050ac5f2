//! Handlers for the `/admin` resource. Every route requires the `admin` role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use notekeep_core::note_filter::Visibility;
use notekeep_core::paging::Page;
use notekeep_core::types::DbId;
use notekeep_db::models::note::{ChangeOwnerRequest, NoteView};
use notekeep_db::models::share_token::ShareTokenView;
use notekeep_db::models::user::UserResponse;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{NoteListParams, PageParams};
use crate::response::DataResponse;
use crate::services::users::{self, SetEnabledRequest};
use crate::services::{note_command, note_query, note_share};
use crate::state::AppState;
use crate::uow::UnitOfWork;

/// GET /api/admin/notes
///
/// Notes of all owners. `?owner=` narrows to one user, `?trashed=true`
/// lists the trash instead of active notes.
pub async fn list_notes(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<NoteListParams>,
) -> AppResult<Json<DataResponse<Page<NoteView>>>> {
    let visibility = if params.trashed {
        Visibility::Trashed
    } else {
        Visibility::Active
    };
    let sort = params.sort()?;

    let mut conn = state.pool.acquire().await?;
    let page = note_query::list_all(
        &mut conn,
        visibility,
        &params.criteria(),
        sort,
        params.page_request(),
    )
    .await?;
    Ok(Json(DataResponse { data: page }))
}

/// PUT /api/admin/notes/{id}/owner
pub async fn change_owner(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ChangeOwnerRequest>,
) -> AppResult<Json<DataResponse<NoteView>>> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let view = note_command::change_owner(&mut uow, &admin, id, input).await?;
    uow.commit(&state).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Page<UserResponse>>>> {
    let mut conn = state.pool.acquire().await?;
    let page = users::list(&mut conn, params.page_request()).await?;
    Ok(Json(DataResponse { data: page }))
}

/// PUT /api/admin/users/{id}/enabled
///
/// Disabling also revokes the user's refresh tokens.
pub async fn set_user_enabled(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetEnabledRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let mut tx = state.pool.begin().await?;
    let user = users::set_enabled(&mut tx, &admin, id, input.enabled).await?;
    tx.commit().await?;
    Ok(Json(DataResponse { data: user }))
}

/// GET /api/admin/shares
pub async fn list_shares(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Page<ShareTokenView>>>> {
    let mut conn = state.pool.acquire().await?;
    let page = note_share::list_all(&mut conn, params.page_request()).await?;
    Ok(Json(DataResponse { data: page }))
}

/// DELETE /api/admin/shares/{id}
pub async fn revoke_share(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    note_share::revoke_any(&mut uow, &admin, id).await?;
    uow.commit(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}
