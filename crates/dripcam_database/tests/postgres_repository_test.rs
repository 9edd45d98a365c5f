//! PostgreSQL repository tests.
//!
//! Run with `cargo test -p dripcam_database -- --ignored` against a
//! disposable database named by `DATABASE_URL`.

use chrono::{Duration, Utc};
use dripcam_core::{ImageFilter, ImageStatus, StatusUpdate};
use dripcam_database::{PostgresImageRepository, create_pool, run_migrations};
use dripcam_interface::ImageRepository;

fn repository() -> PostgresImageRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = create_pool(&url, 4).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    PostgresImageRepository::new(pool)
}

#[tokio::test]
#[ignore] // Requires PostgreSQL (DATABASE_URL)
async fn test_lifecycle_round_trip() {
    let repo = repository();
    let created = repo.create("webcam/pg.jpg", Utc::now()).await.unwrap();
    let id = *created.id();
    assert_eq!(*created.status(), ImageStatus::Pending);

    let claimed = repo
        .update_status(id, &StatusUpdate::claim("prompt"))
        .await
        .unwrap();
    assert_eq!(*claimed.attempt(), 1);
    assert_eq!(claimed.prompt().as_deref(), Some("prompt"));

    let err = repo
        .update_status(id, &StatusUpdate::claim("prompt"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let done = repo
        .update_status(id, &StatusUpdate::complete("generated/pg.png", 1))
        .await
        .unwrap();
    assert_eq!(*done.status(), ImageStatus::Completed);
    assert!(done.is_consistent());

    let reset = repo.update_status(id, &StatusUpdate::reset()).await.unwrap();
    assert!(reset.result_image_path().is_none());
    assert_eq!(reset.prompt().as_deref(), Some("prompt"));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL (DATABASE_URL)
async fn test_missing_record_is_not_found() {
    let repo = repository();
    let err = repo.get(i64::MAX).await.unwrap_err();
    assert_eq!(
        err.kind,
        dripcam_error::StorageErrorKind::NotFound(i64::MAX)
    );
}

#[tokio::test]
#[ignore] // Requires PostgreSQL (DATABASE_URL)
async fn test_filtered_query_and_count_agree() {
    let repo = repository();
    let far_past = Utc::now() - Duration::days(3650);
    let id = *repo.create("webcam/ancient.jpg", far_past).await.unwrap().id();

    let filter = ImageFilter::new()
        .with_statuses(&[ImageStatus::Pending])
        .created_before(far_past + Duration::seconds(1));
    let found = repo.query(&filter).await.unwrap();
    assert!(found.iter().any(|i| *i.id() == id));
    assert_eq!(repo.count(&filter).await.unwrap(), found.len());

    repo.update_status(id, &StatusUpdate::orphaned()).await.unwrap();
}
