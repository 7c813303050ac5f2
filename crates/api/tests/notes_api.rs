//! HTTP-level integration tests for `/api/notes`: CRUD, ownership, trash,
//! bulk actions, listing filters and revision history.

mod common;

use axum::http::StatusCode;
use common::{
    access_token, body_json, create_admin, create_note, create_regular_user, delete_auth,
    get_auth, patch_json_auth, post_auth, post_json_auth, put_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

async fn setup_two_users(pool: &PgPool) {
    create_regular_user(pool, "alice").await;
    create_regular_user(pool, "bob").await;
}

// ---------------------------------------------------------------------------
// CRUD and ownership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_create_normalizes_tags_and_sets_owner(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let token = access_token(&app, "alice").await;

    let note = create_note(
        &app,
        &token,
        json!({
            "title": "  Groceries ",
            "content": "milk, eggs",
            "color": "#AABBCC",
            "tags": ["Home", " home ", "Errands"],
        }),
    )
    .await;

    assert_eq!(note["title"], "Groceries");
    assert_eq!(note["owner"], "alice");
    assert_eq!(note["tags"], json!(["errands", "home"]));
    assert_eq!(note["deleted"], false);
    assert_eq!(note["version"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_create_rejects_invalid_payload(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let token = access_token(&app, "alice").await;

    let cases = [
        json!({ "title": "   " }),
        json!({ "title": "ok", "color": "red" }),
        json!({ "title": "ok", "tags": ["x".repeat(51)] }),
    ];
    for body in cases {
        let response = post_json_auth(app.clone(), "/api/notes", body.clone(), &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_other_users_cannot_read_or_edit_but_admin_can_read(pool: PgPool) {
    setup_two_users(&pool).await;
    create_admin(&pool, "root").await;
    let app = common::build_test_app(pool);
    let alice = access_token(&app, "alice").await;
    let bob = access_token(&app, "bob").await;
    let root = access_token(&app, "root").await;

    let note = create_note(&app, &alice, json!({ "title": "Private" })).await;
    let uri = format!("/api/notes/{}", note["id"]);

    let read = get_auth(app.clone(), &uri, &bob).await;
    assert_eq!(read.status(), StatusCode::FORBIDDEN);

    let edit = put_json_auth(app.clone(), &uri, json!({ "title": "Mine now" }), &bob).await;
    assert_eq!(edit.status(), StatusCode::FORBIDDEN);

    let admin_read = get_auth(app.clone(), &uri, &root).await;
    assert_eq!(admin_read.status(), StatusCode::OK);

    // Admins read anything but only owners edit.
    let admin_edit = put_json_auth(app, &uri, json!({ "title": "Hijack" }), &root).await;
    assert_eq!(admin_edit.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_update_bumps_version_and_keeps_tags_when_omitted(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let token = access_token(&app, "alice").await;
    let note = create_note(&app, &token, json!({ "title": "Draft", "tags": ["work"] })).await;
    let uri = format!("/api/notes/{}", note["id"]);

    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "title": "Final", "content": "done", "pinned": true }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["pinned"], true);
    assert_eq!(updated["tags"], json!(["work"]));
    assert_eq!(updated["version"], 1);

    // The cached view must reflect the update.
    let fetched = body_json(get_auth(app, &uri, &token).await).await["data"].clone();
    assert_eq!(fetched["title"], "Final");
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_patch_changes_only_provided_fields(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let token = access_token(&app, "alice").await;
    let note = create_note(
        &app,
        &token,
        json!({ "title": "Keep me", "content": "body", "tags": ["a"] }),
    )
    .await;
    let uri = format!("/api/notes/{}", note["id"]);

    let response = patch_json_auth(app, &uri, json!({ "color": "#112233" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched = body_json(response).await["data"].clone();
    assert_eq!(patched["title"], "Keep me");
    assert_eq!(patched["content"], "body");
    assert_eq!(patched["color"], "#112233");
    assert_eq!(patched["tags"], json!(["a"]));
}

// ---------------------------------------------------------------------------
// Trash lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_soft_delete_restore_and_purge(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let token = access_token(&app, "alice").await;
    let note = create_note(&app, &token, json!({ "title": "Temp" })).await;
    let id = note["id"].as_i64().unwrap();
    let uri = format!("/api/notes/{id}");

    // Purging an active note is refused.
    let early_purge = delete_auth(app.clone(), &format!("{uri}/permanent"), &token).await;
    assert_eq!(early_purge.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let deleted = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let hidden = get_auth(app.clone(), &uri, &token).await;
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

    let trash = body_json(get_auth(app.clone(), "/api/notes/trash", &token).await).await;
    assert_eq!(trash["data"]["total_items"], 1);
    assert_eq!(trash["data"]["items"][0]["id"], id);
    assert_eq!(trash["data"]["items"][0]["deleted_by"], "alice");

    let restored = post_auth(app.clone(), &format!("{uri}/restore"), &token).await;
    assert_eq!(restored.status(), StatusCode::OK);
    assert_eq!(body_json(restored).await["data"]["deleted"], false);

    delete_auth(app.clone(), &uri, &token).await;
    let purged = delete_auth(app.clone(), &format!("{uri}/permanent"), &token).await;
    assert_eq!(purged.status(), StatusCode::NO_CONTENT);

    let gone = post_auth(app, &format!("{uri}/restore"), &token).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_bulk_reports_ineligible_ids_as_failed(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let alice = access_token(&app, "alice").await;
    let bob = access_token(&app, "bob").await;

    let a1 = create_note(&app, &alice, json!({ "title": "a1" })).await["id"].clone();
    let a2 = create_note(&app, &alice, json!({ "title": "a2" })).await["id"].clone();
    let b1 = create_note(&app, &bob, json!({ "title": "b1" })).await["id"].clone();

    let response = post_json_auth(
        app.clone(),
        "/api/notes/bulk",
        json!({ "action": "DELETE_SOFT", "ids": [a1, a2, b1, 999_999] }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await["data"].clone();
    assert_eq!(result["processed_count"], 2);
    assert_eq!(result["failed_ids"], json!([b1, 999_999]));

    // Restoring an active note fails; the trashed one succeeds.
    let b_note = create_note(&app, &alice, json!({ "title": "a3" })).await["id"].clone();
    let response = post_json_auth(
        app.clone(),
        "/api/notes/bulk",
        json!({ "action": "RESTORE", "ids": [a1, b_note] }),
        &alice,
    )
    .await;
    let result = body_json(response).await["data"].clone();
    assert_eq!(result["processed_count"], 1);
    assert_eq!(result["failed_ids"], json!([b_note]));

    let response = post_json_auth(
        app,
        "/api/notes/bulk",
        json!({ "action": "DELETE_FOREVER", "ids": [a2] }),
        &alice,
    )
    .await;
    let result = body_json(response).await["data"].clone();
    assert_eq!(result["processed_count"], 1);
    assert_eq!(result["failed_ids"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_bulk_rejects_more_than_one_hundred_ids(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let token = access_token(&app, "alice").await;

    let ids: Vec<i64> = (1..=101).collect();
    let response = post_json_auth(
        app,
        "/api/notes/bulk",
        json!({ "action": "DELETE_SOFT", "ids": ids }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_concurrent_bulk_deletes_account_for_every_id(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let token = access_token(&app, "alice").await;
    let id = create_note(&app, &token, json!({ "title": "contested" })).await["id"].clone();

    let body = json!({ "action": "DELETE_SOFT", "ids": [id] });
    let (first, second) = tokio::join!(
        post_json_auth(app.clone(), "/api/notes/bulk", body.clone(), &token),
        post_json_auth(app.clone(), "/api/notes/bulk", body, &token),
    );
    let first = body_json(first).await["data"].clone();
    let second = body_json(second).await["data"].clone();

    // Exactly one call trashes the note; the other reports it as failed.
    let processed = first["processed_count"].as_u64().unwrap()
        + second["processed_count"].as_u64().unwrap();
    assert_eq!(processed, 1);
    let mut failed = first["failed_ids"].as_array().unwrap().clone();
    failed.extend(second["failed_ids"].as_array().unwrap().iter().cloned());
    assert_eq!(failed, vec![id.clone()]);

    let history = body_json(
        get_auth(app, &format!("/api/notes/{id}/revisions"), &token).await,
    )
    .await;
    assert_eq!(history["data"]["total_items"], 2, "ADD plus a single MOD");
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_list_is_owner_scoped_filtered_and_pinned_first(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let alice = access_token(&app, "alice").await;
    let bob = access_token(&app, "bob").await;

    create_note(&app, &alice, json!({ "title": "Meeting notes", "tags": ["work"] })).await;
    create_note(&app, &alice, json!({ "title": "Recipe", "pinned": true })).await;
    create_note(&app, &alice, json!({ "title": "Standup", "tags": ["work"] })).await;
    create_note(&app, &bob, json!({ "title": "Bob's meeting", "tags": ["work"] })).await;

    let all = body_json(get_auth(app.clone(), "/api/notes", &alice).await).await;
    assert_eq!(all["data"]["total_items"], 3);
    assert_eq!(all["data"]["items"][0]["title"], "Recipe");

    let by_tag = body_json(get_auth(app.clone(), "/api/notes?tag=WORK", &alice).await).await;
    assert_eq!(by_tag["data"]["total_items"], 2);

    let by_search =
        body_json(get_auth(app.clone(), "/api/notes?search=meeting", &alice).await).await;
    assert_eq!(by_search["data"]["total_items"], 1);
    assert_eq!(by_search["data"]["items"][0]["title"], "Meeting notes");

    let paged =
        body_json(get_auth(app.clone(), "/api/notes?size=2&page=1", &alice).await).await;
    assert_eq!(paged["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(paged["data"]["total_pages"], 2);

    let bad_sort = get_auth(app, "/api/notes?sort=owner,asc", &alice).await;
    assert_eq!(bad_sort.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Revisions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_revisions_are_listed_newest_first_and_restorable(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let token = access_token(&app, "alice").await;
    let note = create_note(&app, &token, json!({ "title": "v1", "tags": ["one"] })).await;
    let uri = format!("/api/notes/{}", note["id"]);

    put_json_auth(
        app.clone(),
        &uri,
        json!({ "title": "v2", "tags": ["two"] }),
        &token,
    )
    .await;

    let history = body_json(get_auth(app.clone(), &format!("{uri}/revisions"), &token).await).await;
    let items = history["data"]["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["revision_type"], "MOD");
    assert_eq!(items[0]["note"]["title"], "v2");
    assert_eq!(items[1]["revision_type"], "ADD");
    let first_rev = items[1]["revision_number"].clone();

    let one = get_auth(app.clone(), &format!("{uri}/revisions/{first_rev}"), &token).await;
    assert_eq!(one.status(), StatusCode::OK);
    assert_eq!(body_json(one).await["data"]["note"]["tags"], json!(["one"]));

    let restored =
        post_auth(app.clone(), &format!("{uri}/revisions/{first_rev}/restore"), &token).await;
    assert_eq!(restored.status(), StatusCode::OK);
    let view = body_json(restored).await["data"].clone();
    assert_eq!(view["title"], "v1");
    assert_eq!(view["tags"], json!(["one"]));

    let history = body_json(get_auth(app.clone(), &format!("{uri}/revisions"), &token).await).await;
    assert_eq!(history["data"]["total_items"], 3);

    let missing = get_auth(app, &format!("{uri}/revisions/999999"), &token).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_tag_suggest_and_usage_are_owner_scoped(pool: PgPool) {
    setup_two_users(&pool).await;
    let app = common::build_test_app(pool);
    let alice = access_token(&app, "alice").await;
    let bob = access_token(&app, "bob").await;

    create_note(&app, &alice, json!({ "title": "a", "tags": ["work", "workout"] })).await;
    create_note(&app, &alice, json!({ "title": "b", "tags": ["work"] })).await;
    create_note(&app, &bob, json!({ "title": "c", "tags": ["worship"] })).await;

    let suggest = body_json(get_auth(app.clone(), "/api/tags/suggest?prefix=WOR", &alice).await).await;
    assert_eq!(suggest["data"], json!(["work", "workout"]));

    let usage = body_json(get_auth(app, "/api/tags", &alice).await).await;
    assert_eq!(usage["data"][0]["name"], "work");
    assert_eq!(usage["data"][0]["usage_count"], 2);
    assert_eq!(usage["data"].as_array().unwrap().len(), 2);
}
