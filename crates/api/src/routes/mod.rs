pub mod admin;
pub mod auth;
pub mod health;
pub mod notes;
pub mod share;
pub mod tags;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/login, /auth/refresh, /auth/logout, /auth/register    public
/// /auth/me, /auth/change-password                             auth required
///
/// /notes                                  list, create
/// /notes/trash                            trashed notes
/// /notes/bulk                             bulk actions
/// /notes/{id}                             get, replace, patch, soft delete
/// /notes/{id}/restore                     restore from trash
/// /notes/{id}/permanent                   purge a trashed note
/// /notes/{id}/revisions                   revision history
/// /notes/{id}/revisions/{rev}             one revision
/// /notes/{id}/revisions/{rev}/restore     roll back to a revision
/// /notes/{id}/share                       issue, list share links
/// /notes/{id}/share/{token_id}            revoke a share link
///
/// /share/{token}                          consume a share link (public)
///
/// /tags                                   caller's tags with usage counts
/// /tags/suggest                           tag autocomplete
///
/// /admin/notes                            all notes (admin only)
/// /admin/notes/{id}/owner                 change owner
/// /admin/users                            list users
/// /admin/users/{id}/enabled               enable / disable
/// /admin/shares                           all share links
/// /admin/shares/{id}                      revoke any share link
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/notes", notes::router())
        .nest("/share", share::router())
        .nest("/tags", tags::router())
        .nest("/admin", admin::router())
}
