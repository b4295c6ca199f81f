//! Media Query/Mutation Service: presigned-URL joining, pin round-trips,
//! ownership enforcement, and delete cleanup.

mod common;

use common::{seed_image, test_app};
use media_vault::error::AppError;
use media_vault::models::PreviewState;

#[tokio::test]
async fn list_joins_records_with_fresh_urls_and_preview_fallback() {
    let app = test_app();
    seed_image(&app, "images/1-pending.png", "alice", 64, 64);
    seed_image(&app, "images/2-ready.png", "alice", 64, 64);

    // Give the second record a preview.
    app.previews.on_blob_created("images/2-ready.png").await;

    let page = app.media.list("alice", None, 1, 50).await.unwrap();
    assert_eq!(page.total_items, 2);

    let pending = page
        .data
        .iter()
        .find(|i| i.file_key == "images/1-pending.png")
        .unwrap();
    let ready = page
        .data
        .iter()
        .find(|i| i.file_key == "images/2-ready.png")
        .unwrap();

    // No preview yet: the preview URL falls back to the original.
    assert!(pending.url.contains("images/1-pending.png"));
    assert_eq!(pending.preview_url, pending.url);

    // Preview ready: the preview URL points at the preview object.
    assert!(ready.preview_url.contains("previews/2-ready.png"));
    assert_ne!(ready.preview_url, ready.url);
}

#[tokio::test]
async fn list_is_scoped_to_the_caller_and_filters_by_pin_state() {
    let app = test_app();
    seed_image(&app, "images/1-alice.png", "alice", 32, 32);
    seed_image(&app, "images/2-alice.png", "alice", 32, 32);
    seed_image(&app, "images/3-bob.png", "bob", 32, 32);

    app.media
        .set_pinned("alice", "images/1-alice.png", true)
        .await
        .unwrap();

    let all = app.media.list("alice", None, 1, 50).await.unwrap();
    assert_eq!(all.total_items, 2);
    assert!(all.data.iter().all(|i| i.uploaded_by == "alice"));

    let pinned = app.media.list("alice", Some(true), 1, 50).await.unwrap();
    assert_eq!(pinned.total_items, 1);
    assert_eq!(pinned.data[0].file_key, "images/1-alice.png");

    let unpinned = app.media.list("alice", Some(false), 1, 50).await.unwrap();
    assert_eq!(unpinned.total_items, 1);
    assert_eq!(unpinned.data[0].file_key, "images/2-alice.png");
}

#[tokio::test]
async fn pin_then_unpin_restores_the_original_state() {
    let app = test_app();
    seed_image(&app, "images/1-a.png", "alice", 32, 32);

    app.media.set_pinned("alice", "images/1-a.png", true).await.unwrap();
    assert!(app.metadata.record("images/1-a.png").unwrap().pinned);

    // Pinning twice is an idempotent no-op success.
    app.media.set_pinned("alice", "images/1-a.png", true).await.unwrap();

    app.media.set_pinned("alice", "images/1-a.png", false).await.unwrap();
    assert!(!app.metadata.record("images/1-a.png").unwrap().pinned);

    let page = app.media.list("alice", None, 1, 50).await.unwrap();
    assert!(!page.data[0].pinned);
}

#[tokio::test]
async fn mutations_by_non_owners_are_rejected_and_change_nothing() {
    let app = test_app();
    seed_image(&app, "images/1-alice.png", "alice", 32, 32);

    let err = app
        .media
        .delete("bob", "images/1-alice.png")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .media
        .set_pinned("bob", "images/1-alice.png", true)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Both the blob and the record are untouched.
    assert!(app.blobs.contains("images/1-alice.png"));
    let record = app.metadata.record("images/1-alice.png").unwrap();
    assert!(!record.pinned);
}

#[tokio::test]
async fn mutating_a_missing_record_is_not_found() {
    let app = test_app();

    assert!(matches!(
        app.media.delete("alice", "images/404.png").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        app.media.set_pinned("alice", "images/404.png", true).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn delete_removes_blob_preview_and_record() {
    let app = test_app();
    seed_image(&app, "images/1-a.png", "alice", 64, 64);
    app.previews.on_blob_created("images/1-a.png").await;
    assert!(app
        .metadata
        .record("images/1-a.png")
        .unwrap()
        .preview
        .is_ready());

    app.media.delete("alice", "images/1-a.png").await.unwrap();

    assert!(!app.blobs.contains("images/1-a.png"));
    assert!(!app.blobs.contains("previews/1-a.png"));
    assert!(app.metadata.record("images/1-a.png").is_none());
}

#[tokio::test]
async fn delete_works_for_records_without_a_preview() {
    let app = test_app();
    seed_image(&app, "images/1-a.png", "alice", 32, 32);
    assert_eq!(
        app.metadata.record("images/1-a.png").unwrap().preview,
        PreviewState::Pending
    );

    app.media.delete("alice", "images/1-a.png").await.unwrap();

    assert_eq!(app.blobs.object_count(), 0);
    assert_eq!(app.metadata.record_count(), 0);
}
