//! HTTP-level integration tests for `/api/auth`.
//!
//! Covers login, refresh-token rotation, logout, registration, password
//! changes and cookie-based authentication.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_regular_user, get, get_auth, get_with_cookie, login, post_json,
    post_json_auth, set_cookies, TEST_PASSWORD,
};
use notekeep_db::repositories::UserRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_login_returns_tokens_and_sets_cookies(pool: PgPool) {
    let user = create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "  ALICE ", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("AUTH-TOKEN=")));
    assert!(cookies.iter().any(|c| c.starts_with("REFRESH-TOKEN=")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly") && c.contains("SameSite=Strict")));

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["refresh_expires_in"], 7 * 24 * 3600);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["roles"], serde_json::json!(["user"]));
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_login_remember_me_extends_refresh_lifetime(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "alice",
        "password": TEST_PASSWORD,
        "remember_me": true,
    });
    let json = body_json(post_json(app, "/api/auth/login", body).await).await;
    assert_eq!(json["refresh_expires_in"], 30 * 24 * 3600);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_login_wrong_password_and_unknown_user_look_the_same(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);

    let wrong = post_json(
        app.clone(),
        "/api/auth/login",
        serde_json::json!({ "username": "alice", "password": "not-the-password" }),
    )
    .await;
    let unknown = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({ "username": "nobody", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await, body_json(unknown).await);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_login_disabled_account_is_rejected(pool: PgPool) {
    let user = create_regular_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();
    UserRepo::set_enabled(&mut conn, user.id, false).await.unwrap();
    drop(conn);
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({ "username": "alice", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "ACCOUNT_DISABLED");
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_refresh_rotates_and_old_token_is_dead(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);
    let first = login(&app, "alice").await;
    let old_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/auth/refresh",
        serde_json::json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_ne!(second["refresh_token"], first["refresh_token"]);
    assert!(second["access_token"].is_string());

    let replay = post_json(
        app,
        "/api/auth/refresh",
        serde_json::json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_refresh_reads_cookie_when_body_is_absent(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);
    let tokens = login(&app, "alice").await;
    let refresh = tokens["refresh_token"].as_str().unwrap();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header("cookie", format!("REFRESH-TOKEN={refresh}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = common::send(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_refresh_with_blank_or_unknown_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);

    for token in ["", "   ", "definitely-not-issued"] {
        let response = post_json(
            app.clone(),
            "/api/auth/refresh",
            serde_json::json!({ "refresh_token": token }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "token {token:?}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_logout_revokes_refresh_token_and_clears_cookies(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);
    let tokens = login(&app, "alice").await;
    let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/auth/logout",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("AUTH-TOKEN=;")));
    assert!(cookies.iter().any(|c| c.starts_with("REFRESH-TOKEN=;")));

    let after = post_json(
        app,
        "/api/auth/refresh",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_logout_with_unknown_token_is_a_no_op(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/auth/logout",
        serde_json::json!({ "refresh_token": "never-issued" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Change password
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_change_password_revokes_every_refresh_token(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);
    let laptop = login(&app, "alice").await;
    let phone = login(&app, "alice").await;
    let token = laptop["access_token"].as_str().unwrap();

    let response = post_json_auth(
        app.clone(),
        "/api/auth/change-password",
        serde_json::json!({
            "current_password": TEST_PASSWORD,
            "new_password": "a-brand-new-secret",
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for session in [&laptop, &phone] {
        let response = post_json(
            app.clone(),
            "/api/auth/refresh",
            serde_json::json!({ "refresh_token": session["refresh_token"] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let relogin = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({ "username": "alice", "password": "a-brand-new-secret" }),
    )
    .await;
    assert_eq!(relogin.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_change_password_requires_current_password(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);
    let token = common::access_token(&app, "alice").await;

    let response = post_json_auth(
        app,
        "/api/auth/change-password",
        serde_json::json!({
            "current_password": "wrong-guess",
            "new_password": "a-brand-new-secret",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Register / me
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_register_normalizes_and_assigns_user_role(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/auth/register",
        serde_json::json!({
            "username": " Bob.Smith ",
            "email": "Bob@Example.com",
            "password": "long-enough-pw",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "bob.smith");
    assert_eq!(json["data"]["email"], "bob@example.com");
    assert_eq!(json["data"]["roles"], serde_json::json!(["user"]));
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_register_conflicts_name_the_taken_field(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);

    let same_name = post_json(
        app.clone(),
        "/api/auth/register",
        serde_json::json!({
            "username": "ALICE",
            "email": "fresh@test.com",
            "password": "long-enough-pw",
        }),
    )
    .await;
    assert_eq!(same_name.status(), StatusCode::CONFLICT);
    let message = body_json(same_name).await["error"].as_str().unwrap().to_string();
    assert!(message.contains("Username"), "{message}");

    let same_email = post_json(
        app,
        "/api/auth/register",
        serde_json::json!({
            "username": "someone-else",
            "email": "alice@test.com",
            "password": "long-enough-pw",
        }),
    )
    .await;
    assert_eq!(same_email.status(), StatusCode::CONFLICT);
    let message = body_json(same_email).await["error"].as_str().unwrap().to_string();
    assert!(message.contains("Email"), "{message}");
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_register_rejects_invalid_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    let cases = [
        serde_json::json!({ "username": "ok_name", "email": "not-an-email", "password": "long-enough-pw" }),
        serde_json::json!({ "username": "ok_name", "email": "ok@test.com", "password": "short" }),
        serde_json::json!({ "username": "x", "email": "ok@test.com", "password": "long-enough-pw" }),
        serde_json::json!({ "username": "bad name!", "email": "ok@test.com", "password": "long-enough-pw" }),
    ];
    for body in cases {
        let response = post_json(app.clone(), "/api/auth/register", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_me_accepts_header_or_cookie(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);
    let token = common::access_token(&app, "alice").await;

    let by_header = get_auth(app.clone(), "/api/auth/me", &token).await;
    assert_eq!(by_header.status(), StatusCode::OK);
    assert_eq!(body_json(by_header).await["data"]["username"], "alice");

    let by_cookie =
        get_with_cookie(app.clone(), "/api/auth/me", &format!("AUTH-TOKEN={token}")).await;
    assert_eq!(by_cookie.status(), StatusCode::OK);

    let anonymous = get(app, "/api/auth/me").await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_tampered_access_token_is_unauthorized(pool: PgPool) {
    create_regular_user(&pool, "alice").await;
    let app = common::build_test_app(pool);
    let token = common::access_token(&app, "alice").await;

    let response = get_auth(app, "/api/auth/me", &format!("{token}x")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
