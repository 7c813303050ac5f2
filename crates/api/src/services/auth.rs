//! Login, refresh-token rotation, logout, registration and password changes.
//!
//! Access tokens are stateless JWTs. Refresh tokens are opaque random values;
//! only their SHA-256 is persisted, and each one is single-use: `refresh`
//! revokes the presented token before issuing its replacement.

use chrono::Utc;
use notekeep_core::access::Principal;
use notekeep_core::error::CoreError;
use notekeep_core::roles::DEFAULT_ROLE;
use notekeep_core::tokens::{generate_token, hash_token};
use notekeep_core::types::DbId;
use notekeep_core::validation::{
    normalize_email, normalize_username, validate_password_strength, validate_username,
    MIN_PASSWORD_LENGTH,
};
use notekeep_db::models::refresh_token::CreateRefreshToken;
use notekeep_db::models::user::{CreateUser, User, UserResponse};
use notekeep_db::repositories::{RefreshTokenRepo, RoleRepo, UserRepo};
use notekeep_db::DbPool;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use validator::Validate;

use crate::auth::jwt::{generate_access_token, JwtConfig};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{unique_violation, AppError, AppResult};

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Body form of a refresh or logout call. The cookie is used when absent.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Issued credentials. The raw refresh token appears here exactly once.
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Check credentials and issue an access + refresh token pair.
///
/// Unknown usernames and wrong passwords produce the same error.
pub async fn login(
    conn: &mut PgConnection,
    jwt: &JwtConfig,
    input: LoginRequest,
) -> AppResult<AuthTokens> {
    let username = normalize_username(&input.username);
    let user = UserRepo::find_by_username(conn, &username)
        .await?
        .ok_or_else(bad_credentials)?;

    let valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::info!(username = %username, "Login failed: wrong password");
        return Err(bad_credentials());
    }
    if !user.enabled {
        return Err(account_disabled());
    }

    let roles = RoleRepo::names_for_user(conn, user.id).await?;
    let tokens = issue_tokens(conn, jwt, &user, roles, input.remember_me).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(tokens)
}

/// Rotate a refresh token: revoke the presented one and issue a new pair.
///
/// Must run inside a transaction; the token row is locked for the duration.
pub async fn refresh(
    conn: &mut PgConnection,
    jwt: &JwtConfig,
    raw_token: &str,
) -> AppResult<AuthTokens> {
    if raw_token.trim().is_empty() {
        return Err(CoreError::invalid_bearer_token().into());
    }

    let stored = RefreshTokenRepo::find_valid_by_hash_for_update(conn, &hash_token(raw_token))
        .await?
        .ok_or_else(CoreError::invalid_bearer_token)?;

    let user = UserRepo::find_by_id(conn, stored.user_id)
        .await?
        .ok_or_else(CoreError::invalid_bearer_token)?;
    if !user.enabled {
        return Err(account_disabled());
    }

    RefreshTokenRepo::revoke(conn, stored.id).await?;

    let roles = RoleRepo::names_for_user(conn, user.id).await?;
    let tokens = issue_tokens(conn, jwt, &user, roles, stored.remember_me).await?;

    tracing::debug!(user_id = user.id, "Refresh token rotated");
    Ok(tokens)
}

/// Revoke a refresh token. Blank and unknown tokens are ignored.
pub async fn logout(conn: &mut PgConnection, raw_token: Option<&str>) -> AppResult<()> {
    let Some(raw) = raw_token.filter(|t| !t.trim().is_empty()) else {
        return Ok(());
    };

    if let Some(stored) = RefreshTokenRepo::find_by_hash(conn, &hash_token(raw)).await? {
        if RefreshTokenRepo::revoke(conn, stored.id).await? {
            tracing::info!(user_id = stored.user_id, "User logged out");
        }
    }
    Ok(())
}

/// Replace the caller's password and revoke all of their refresh tokens.
pub async fn change_password(
    conn: &mut PgConnection,
    principal: &Principal,
    input: ChangePasswordRequest,
) -> AppResult<()> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)?;

    let user = load_user(conn, principal.user_id).await?;
    let valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(CoreError::Validation("Current password is incorrect".into()).into());
    }

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(conn, user.id, &new_hash).await?;
    let revoked = RefreshTokenRepo::revoke_all_for_user(conn, user.id).await?;

    tracing::info!(user_id = user.id, revoked, "Password changed");
    Ok(())
}

/// Create an account with the default role.
///
/// Takes the pool rather than a connection: a unique violation aborts the
/// transaction, and the follow-up check that names the conflicting field has
/// to run on a fresh connection.
pub async fn register(pool: &DbPool, input: RegisterRequest) -> AppResult<UserResponse> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)?;

    let username = normalize_username(&input.username);
    let email = normalize_email(&input.email);
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = pool.begin().await?;
    ensure_available(&mut tx, &username, &email).await?;

    let created = UserRepo::create(
        &mut tx,
        &CreateUser {
            username: username.clone(),
            email: email.clone(),
            password_hash,
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        Err(err) if unique_violation(&err).is_some() => {
            // Lost a race with a concurrent registration.
            drop(tx);
            let mut conn = pool.acquire().await?;
            ensure_available(&mut conn, &username, &email).await?;
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    let role = RoleRepo::find_by_name(&mut tx, DEFAULT_ROLE)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{DEFAULT_ROLE}' is not seeded")))?;
    RoleRepo::assign(&mut tx, user.id, role.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok(UserResponse::from_user(&user, vec![role.name]))
}

/// Profile of the authenticated caller.
pub async fn me(conn: &mut PgConnection, principal: &Principal) -> AppResult<UserResponse> {
    let user = load_user(conn, principal.user_id).await?;
    let roles = RoleRepo::names_for_user(conn, user.id).await?;
    Ok(UserResponse::from_user(&user, roles))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn issue_tokens(
    conn: &mut PgConnection,
    jwt: &JwtConfig,
    user: &User,
    roles: Vec<String>,
    remember_me: bool,
) -> AppResult<AuthTokens> {
    let access_token = generate_access_token(user.id, &user.username, &roles, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = generate_token();
    let issued_at = Utc::now();
    let ttl = jwt.refresh_ttl(remember_me);

    RefreshTokenRepo::create(
        conn,
        &CreateRefreshToken {
            user_id: user.id,
            token_hash: refresh.hash,
            issued_at,
            expires_at: issued_at + ttl,
            remember_me,
        },
    )
    .await?;

    Ok(AuthTokens {
        access_token,
        refresh_token: refresh.plaintext,
        token_type: "Bearer",
        expires_in: jwt.access_ttl_secs(),
        refresh_expires_in: ttl.num_seconds(),
        user: UserResponse::from_user(user, roles),
    })
}

async fn ensure_available(conn: &mut PgConnection, username: &str, email: &str) -> AppResult<()> {
    if UserRepo::exists_by_username(conn, username).await? {
        return Err(CoreError::Conflict(format!("Username '{username}' already exists")).into());
    }
    if UserRepo::exists_by_email(conn, email).await? {
        return Err(CoreError::Conflict(format!("Email '{email}' already exists")).into());
    }
    Ok(())
}

async fn load_user(conn: &mut PgConnection, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(conn, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "User", id }.into())
}

fn bad_credentials() -> AppError {
    CoreError::Unauthorized("Invalid username or password".into()).into()
}

fn account_disabled() -> AppError {
    CoreError::Disabled("Account is disabled".into()).into()
}
