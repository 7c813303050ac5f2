//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the `admin` role.
///
/// ```text
/// GET    /notes                -> list_notes
/// PUT    /notes/{id}/owner     -> change_owner
/// GET    /users                -> list_users
/// PUT    /users/{id}/enabled   -> set_user_enabled
/// GET    /shares               -> list_shares
/// DELETE /shares/{id}          -> revoke_share
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notes", get(admin::list_notes))
        .route("/notes/{id}/owner", put(admin::change_owner))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/enabled", put(admin::set_user_enabled))
        .route("/shares", get(admin::list_shares))
        .route("/shares/{id}", delete(admin::revoke_share))
}
