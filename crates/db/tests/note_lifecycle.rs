//! Integration tests for the note repository lifecycle.
//!
//! Exercises soft delete, restore, purge and the filtered search against a
//! real database. Requires `DATABASE_URL`; run with `cargo test -- --ignored`.

use notekeep_core::note_filter::{compose_filters, NoteCriteria, NoteSort, Visibility};
use notekeep_core::paging::PageRequest;
use notekeep_db::models::note::{NewNote, NoteChanges};
use notekeep_db::repositories::NoteRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_note(title: &str, owner: &str) -> NewNote {
    NewNote {
        title: title.to_string(),
        content: format!("content of {title}"),
        pinned: false,
        color: None,
        owner: owner.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_soft_delete_hides_from_find_active(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let note = NoteRepo::create(&mut conn, &new_note("Hidden", "alice"), "alice")
        .await
        .unwrap();

    let affected = NoteRepo::soft_delete(&mut conn, note.id, "alice").await.unwrap();
    assert_eq!(affected, 1);

    assert!(NoteRepo::find_active(&mut conn, note.id).await.unwrap().is_none());
    let raw = NoteRepo::find_by_id(&mut conn, note.id).await.unwrap().unwrap();
    assert!(raw.deleted);
    assert_eq!(raw.deleted_by.as_deref(), Some("alice"));
    assert!(raw.deleted_at.is_some());

    // A second soft delete finds no active row.
    let again = NoteRepo::soft_delete(&mut conn, note.id, "alice").await.unwrap();
    assert_eq!(again, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_restore_clears_deletion_fields(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let note = NoteRepo::create(&mut conn, &new_note("Restore me", "alice"), "alice")
        .await
        .unwrap();

    NoteRepo::soft_delete(&mut conn, note.id, "alice").await.unwrap();
    let restored = NoteRepo::restore(&mut conn, note.id, "alice").await.unwrap();
    assert_eq!(restored, 1);

    let found = NoteRepo::find_active(&mut conn, note.id).await.unwrap().unwrap();
    assert_eq!(found.title, note.title);
    assert_eq!(found.content, note.content);
    assert!(found.deleted_by.is_none());
    assert!(found.deleted_at.is_none());
    assert!(found.version > note.version);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_purge_only_removes_trashed_notes(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let note = NoteRepo::create(&mut conn, &new_note("Purge", "alice"), "alice")
        .await
        .unwrap();

    assert_eq!(NoteRepo::purge(&mut conn, note.id).await.unwrap(), 0);

    NoteRepo::soft_delete(&mut conn, note.id, "alice").await.unwrap();
    assert_eq!(NoteRepo::purge(&mut conn, note.id).await.unwrap(), 1);
    assert!(NoteRepo::find_by_id(&mut conn, note.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_update_bumps_version_and_skips_trashed(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let note = NoteRepo::create(&mut conn, &new_note("Before", "alice"), "alice")
        .await
        .unwrap();

    let mut changes = NoteChanges::from_note(&note);
    changes.title = "After".to_string();
    let updated = NoteRepo::update(&mut conn, note.id, &changes, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "After");
    assert_eq!(updated.version, note.version + 1);

    NoteRepo::soft_delete(&mut conn, note.id, "alice").await.unwrap();
    let none = NoteRepo::update(&mut conn, note.id, &changes, "alice").await.unwrap();
    assert!(none.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_search_is_owner_scoped_and_pins_first(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let first = NoteRepo::create(&mut conn, &new_note("Groceries", "alice"), "alice")
        .await
        .unwrap();
    let mut pinned = new_note("Pinned idea", "alice");
    pinned.pinned = true;
    let pinned = NoteRepo::create(&mut conn, &pinned, "alice").await.unwrap();
    NoteRepo::create(&mut conn, &new_note("Bob's grocery list", "bob"), "bob")
        .await
        .unwrap();

    let filters = compose_filters(Visibility::Active, Some("alice"), &NoteCriteria::default());
    let (notes, total) =
        NoteRepo::search(&mut conn, &filters, NoteSort::default(), PageRequest::default())
            .await
            .unwrap();
    assert_eq!(total, 2);
    assert_eq!(notes[0].id, pinned.id);
    assert_eq!(notes[1].id, first.id);

    let criteria = NoteCriteria {
        search: Some("GROCER".into()),
        ..Default::default()
    };
    let filters = compose_filters(Visibility::Active, None, &criteria);
    let (_, total) =
        NoteRepo::search(&mut conn, &filters, NoteSort::default(), PageRequest::default())
            .await
            .unwrap();
    assert_eq!(total, 2, "case-insensitive match across owners");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_find_states_hides_foreign_notes(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let mine = NoteRepo::create(&mut conn, &new_note("Mine", "alice"), "alice")
        .await
        .unwrap();
    let theirs = NoteRepo::create(&mut conn, &new_note("Theirs", "bob"), "bob")
        .await
        .unwrap();

    let states = NoteRepo::find_states(&mut conn, &[mine.id, theirs.id], Some("alice"))
        .await
        .unwrap();
    assert_eq!(states, vec![(mine.id, false)]);

    let all = NoteRepo::find_states(&mut conn, &[mine.id, theirs.id], None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn test_batch_transitions_return_only_changed_ids(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let active = NoteRepo::create(&mut conn, &new_note("Active", "alice"), "alice")
        .await
        .unwrap();
    let trashed = NoteRepo::create(&mut conn, &new_note("Trashed", "alice"), "alice")
        .await
        .unwrap();
    NoteRepo::soft_delete(&mut conn, trashed.id, "alice").await.unwrap();
    let ids = [active.id, trashed.id, 999_999];

    let deleted = NoteRepo::soft_delete_many(&mut conn, &ids, "alice").await.unwrap();
    assert_eq!(deleted, vec![active.id]);

    let restored = NoteRepo::restore_many(&mut conn, &[trashed.id], "alice").await.unwrap();
    assert_eq!(restored, vec![trashed.id]);

    let purged = NoteRepo::purge_many(&mut conn, &ids).await.unwrap();
    assert_eq!(purged, vec![active.id]);
}
