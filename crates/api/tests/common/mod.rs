#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use notekeep_api::auth::jwt::JwtConfig;
use notekeep_api::auth::password::hash_password;
use notekeep_api::background::tag_janitor::TagJanitor;
use notekeep_api::cache::NoteCache;
use notekeep_api::config::ServerConfig;
use notekeep_api::router::build_app_router;
use notekeep_api::state::AppState;
use notekeep_core::roles::{ROLE_ADMIN, ROLE_USER};
use notekeep_db::models::user::{CreateUser, User};
use notekeep_db::repositories::{RoleRepo, UserRepo};

/// Password of every user created by [`create_user`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        cookie_secure: false,
        note_cache_capacity: 100,
        share_default_ttl_hours: 24,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            issuer: "notekeep-test".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
            remember_me_expiry_days: 30,
        },
        bootstrap_admin: None,
    }
}

/// Build the full application router, with the same middleware stack as
/// production, over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let (tag_janitor, _handle) = TagJanitor::start(pool.clone(), CancellationToken::new());

    let state = AppState {
        pool,
        note_cache: Arc::new(NoteCache::new(config.note_cache_capacity)),
        config: Arc::new(config),
        tag_janitor,
    };
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and the given roles.
pub async fn create_user(pool: &PgPool, username: &str, roles: &[&str]) -> User {
    let mut conn = pool.acquire().await.unwrap();
    let user = UserRepo::create(
        &mut conn,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        },
    )
    .await
    .expect("user creation should succeed");

    for name in roles {
        let role = RoleRepo::find_by_name(&mut conn, name)
            .await
            .unwrap()
            .expect("roles are seeded by migrations");
        RoleRepo::assign(&mut conn, user.id, role.id).await.unwrap();
    }
    user
}

pub async fn create_regular_user(pool: &PgPool, username: &str) -> User {
    create_user(pool, username, &[ROLE_USER]).await
}

pub async fn create_admin(pool: &PgPool, username: &str) -> User {
    create_user(pool, username, &[ROLE_ADMIN, ROLE_USER]).await
}

/// Log in through the API and return the token payload.
pub async fn login(app: &Router, username: &str) -> Value {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app.clone(), "/api/auth/login", body).await;
    assert_eq!(response.status(), 200, "login as {username} should succeed");
    body_json(response).await
}

/// Log in and return only the access token.
pub async fn access_token(app: &Router, username: &str) -> String {
    login(app, username).await["access_token"]
        .as_str()
        .expect("access_token is a string")
        .to_string()
}

/// Create a note through the API and return its `data` payload.
pub async fn create_note(app: &Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app.clone(), "/api/notes", body, token).await;
    assert_eq!(response.status(), 201, "note creation should succeed");
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

/// GET with the access token in the `AUTH-TOKEN` cookie instead of a header.
pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::PATCH, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

/// All `Set-Cookie` header values of a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}
