//! Administrative user management and the startup admin bootstrap.

use notekeep_core::access::Principal;
use notekeep_core::error::CoreError;
use notekeep_core::paging::{Page, PageRequest};
use notekeep_core::roles::{ROLE_ADMIN, ROLE_USER};
use notekeep_core::types::DbId;
use notekeep_core::validation::{
    normalize_email, normalize_username, validate_password_strength, MIN_PASSWORD_LENGTH,
};
use notekeep_db::models::user::{CreateUser, UserResponse};
use notekeep_db::repositories::{RefreshTokenRepo, RoleRepo, UserRepo};
use notekeep_db::DbPool;
use serde::Deserialize;
use sqlx::PgConnection;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// One page of users with their role names.
pub async fn list(conn: &mut PgConnection, page: PageRequest) -> AppResult<Page<UserResponse>> {
    let (users, total) = UserRepo::list(conn, page).await?;
    let ids: Vec<DbId> = users.iter().map(|u| u.id).collect();
    let mut roles = RoleRepo::names_for_users(conn, &ids).await?;

    let items = users
        .iter()
        .map(|user| UserResponse::from_user(user, roles.remove(&user.id).unwrap_or_default()))
        .collect();
    Ok(Page::new(items, page, total))
}

/// Enable or disable an account. Disabling revokes every refresh token the
/// user holds, so they are signed out once their access token lapses.
pub async fn set_enabled(
    conn: &mut PgConnection,
    admin: &Principal,
    user_id: DbId,
    enabled: bool,
) -> AppResult<UserResponse> {
    if user_id == admin.user_id && !enabled {
        return Err(
            CoreError::InvalidOperation("Administrators cannot disable their own account".into())
                .into(),
        );
    }

    let user = UserRepo::set_enabled(conn, user_id, enabled)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user_id,
        })?;

    if !enabled {
        let revoked = RefreshTokenRepo::revoke_all_for_user(conn, user.id).await?;
        tracing::info!(user_id, revoked, admin = %admin.username, "User disabled");
    } else {
        tracing::info!(user_id, admin = %admin.username, "User enabled");
    }

    let roles = RoleRepo::names_for_user(conn, user.id).await?;
    Ok(UserResponse::from_user(&user, roles))
}

/// Create the configured admin account if it does not exist yet.
pub async fn bootstrap_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<()> {
    let username = normalize_username(&admin.username);
    let mut tx = pool.begin().await?;

    if UserRepo::exists_by_username(&mut tx, &username).await? {
        tracing::debug!(username = %username, "Bootstrap admin already present");
        return Ok(());
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &mut tx,
        &CreateUser {
            username,
            email: normalize_email(&admin.email),
            password_hash,
        },
    )
    .await?;

    for role_name in [ROLE_ADMIN, ROLE_USER] {
        let role = RoleRepo::find_by_name(&mut tx, role_name)
            .await?
            .ok_or_else(|| AppError::InternalError(format!("Role '{role_name}' is not seeded")))?;
        RoleRepo::assign(&mut tx, user.id, role.id).await?;
    }
    tx.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    Ok(())
}
