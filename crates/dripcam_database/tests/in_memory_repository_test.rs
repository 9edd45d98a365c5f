//! Behavior tests for the in-memory image repository.

use chrono::{Duration, Utc};
use dripcam_core::{ImageFilter, ImageStatus, ORPHANED_JOB_MESSAGE, StatusUpdate};
use dripcam_database::InMemoryImageRepository;
use dripcam_interface::ImageRepository;
use futures::future::join_all;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_exactly_one_wins() {
    let repo = InMemoryImageRepository::new();
    let image = repo.create("webcam/race.jpg", Utc::now()).await.unwrap();
    let id = *image.id();

    let claims = (0..8).map(|_| {
        let repo = repo.clone();
        tokio::spawn(async move { repo.update_status(id, &StatusUpdate::claim("prompt")).await })
    });

    let results = join_all(claims).await;
    let winners = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(Result::is_ok)
        .count();

    assert_eq!(winners, 1);
    let stored = repo.get(id).await.unwrap();
    assert_eq!(*stored.status(), ImageStatus::Processing);
    assert_eq!(*stored.attempt(), 1);
}

#[tokio::test]
async fn test_superseded_attempt_cannot_complete() {
    let repo = InMemoryImageRepository::new();
    let id = *repo.create("webcam/a.jpg", Utc::now()).await.unwrap().id();

    repo.update_status(id, &StatusUpdate::claim("p")).await.unwrap();
    repo.update_status(id, &StatusUpdate::reset()).await.unwrap();
    let second = repo.update_status(id, &StatusUpdate::claim("p")).await.unwrap();
    assert_eq!(*second.attempt(), 2);

    let stale = repo
        .update_status(id, &StatusUpdate::complete("generated/old.png", 1))
        .await;
    assert!(stale.unwrap_err().is_conflict());

    let done = repo
        .update_status(id, &StatusUpdate::complete("generated/new.png", 2))
        .await
        .unwrap();
    assert_eq!(*done.status(), ImageStatus::Completed);
    assert_eq!(done.result_image_path().as_deref(), Some("generated/new.png"));
    assert!(done.error_message().is_none());
}

#[tokio::test]
async fn test_reset_clears_result_and_error() {
    let repo = InMemoryImageRepository::new();
    let id = *repo.create("webcam/a.jpg", Utc::now()).await.unwrap().id();

    repo.update_status(id, &StatusUpdate::claim("p")).await.unwrap();
    repo.update_status(id, &StatusUpdate::fail("provider down", 1))
        .await
        .unwrap();

    let reset = repo.update_status(id, &StatusUpdate::reset()).await.unwrap();
    assert_eq!(*reset.status(), ImageStatus::Pending);
    assert!(reset.error_message().is_none());
    assert!(reset.result_image_path().is_none());
    assert!(reset.is_consistent());
}

#[tokio::test]
async fn test_orphan_filter_selects_old_in_flight_records() {
    let repo = InMemoryImageRepository::new();
    let now = Utc::now();

    let old_pending = *repo
        .create("webcam/old.jpg", now - Duration::hours(3))
        .await
        .unwrap()
        .id();
    let old_processing = *repo
        .create("webcam/old2.jpg", now - Duration::hours(2))
        .await
        .unwrap()
        .id();
    repo.update_status(old_processing, &StatusUpdate::claim("p"))
        .await
        .unwrap();
    let _fresh = repo
        .create("webcam/new.jpg", now - Duration::minutes(5))
        .await
        .unwrap();

    let filter = ImageFilter::new()
        .with_statuses(&ImageStatus::IN_FLIGHT)
        .older_than(Duration::hours(1), now)
        .without_result();
    let stuck = repo.query(&filter).await.unwrap();
    let ids: Vec<i64> = stuck.iter().map(|i| *i.id()).collect();
    assert_eq!(ids, vec![old_processing, old_pending]);

    for id in ids {
        let failed = repo
            .update_status(id, &StatusUpdate::orphaned())
            .await
            .unwrap();
        assert_eq!(failed.error_message().as_deref(), Some(ORPHANED_JOB_MESSAGE));
    }
    assert_eq!(repo.count(&filter).await.unwrap(), 0);
    assert_eq!(repo.len().await, 3);
}
