//! Generation worker behavior.

mod test_utils;

use dripcam_core::{ImageStatus, ORPHANED_JOB_MESSAGE, StatusUpdate};
use dripcam_error::GenerationErrorKind;
use dripcam_interface::{MediaKind, MediaStore};
use dripcam_pipeline::{GenerationWorker, ReconcileScope, Reconciler, WorkerOutcome};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{GENERATED_BYTES, Harness, MockBehavior, MockGenerator};
use tokio::sync::Notify;

const PROMPT: &str = "add a cosmic background";

async fn pending_capture(harness: &Harness) -> i64 {
    let path = harness
        .media
        .store(MediaKind::Capture, b"jpeg bytes")
        .await
        .unwrap();
    *harness.store.create(&path).await.unwrap().id()
}

fn generated_files(harness: &Harness) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(harness.media_root.path().join("generated")) else {
        return Vec::new();
    };
    entries
        .map(|entry| format!("generated/{}", entry.unwrap().file_name().to_string_lossy()))
        .collect()
}

fn worker(harness: &Harness, generator: &MockGenerator) -> GenerationWorker {
    GenerationWorker::new(
        harness.store.clone(),
        harness.media.clone(),
        Arc::new(generator.clone()),
        PROMPT,
    )
}

#[tokio::test]
async fn test_success_completes_with_stored_result() {
    let harness = Harness::new();
    let generator = MockGenerator::new([MockBehavior::Succeed(GENERATED_BYTES.to_vec())]);
    let id = pending_capture(&harness).await;

    let outcome = worker(&harness, &generator).run(id).await;
    let WorkerOutcome::Completed(image) = outcome else {
        panic!("expected completion, got {:?}", outcome);
    };

    assert_eq!(*image.status(), ImageStatus::Completed);
    assert_eq!(image.prompt().as_deref(), Some(PROMPT));
    assert!(image.error_message().is_none());
    let result_path = image.result_image_path().clone().unwrap();
    assert!(result_path.starts_with("generated/generated_"));
    assert_eq!(harness.media.load(&result_path).await.unwrap(), GENERATED_BYTES);
    assert_eq!(generator.prompts(), vec![PROMPT.to_string()]);
}

#[tokio::test]
async fn test_provider_timeout_fails_record() {
    let harness = Harness::new();
    let generator = MockGenerator::new([MockBehavior::Fail(GenerationErrorKind::Timeout {
        seconds: 120,
    })]);
    let id = pending_capture(&harness).await;

    let outcome = worker(&harness, &generator).run(id).await;
    let WorkerOutcome::Failed(image) = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };

    assert_eq!(*image.status(), ImageStatus::Failed);
    assert!(image.error_message().as_deref().unwrap().contains("timed out"));
    assert!(image.result_image_path().is_none());
}

#[tokio::test]
async fn test_declined_diagnostic_includes_provider_text() {
    let harness = Harness::new();
    let generator = MockGenerator::new([MockBehavior::Fail(GenerationErrorKind::Declined(Some(
        "No people, sorry".to_string(),
    )))]);
    let id = pending_capture(&harness).await;

    let outcome = worker(&harness, &generator).run(id).await;
    let stored = harness.store.get(id).await.unwrap();
    assert_eq!(outcome.terminal_status(), Some(ImageStatus::Failed));
    assert!(stored.error_message().as_deref().unwrap().contains("No people, sorry"));
}

#[tokio::test]
async fn test_panic_is_contained_and_recorded() {
    let harness = Harness::new();
    let generator = MockGenerator::new([MockBehavior::Panic]);
    let id = pending_capture(&harness).await;

    let outcome = worker(&harness, &generator).run(id).await;
    assert_eq!(outcome.terminal_status(), Some(ImageStatus::Failed));

    let stored = harness.store.get(id).await.unwrap();
    let message = stored.error_message().clone().unwrap();
    assert!(message.contains("panicked"));
    assert!(message.contains("mock provider exploded"));
}

#[tokio::test]
async fn test_missing_capture_fails_without_calling_provider() {
    let harness = Harness::new();
    let generator = MockGenerator::new([MockBehavior::Succeed(GENERATED_BYTES.to_vec())]);
    let id = *harness.store.create("webcam/missing.jpg").await.unwrap().id();

    let outcome = worker(&harness, &generator).run(id).await;
    assert_eq!(outcome.terminal_status(), Some(ImageStatus::Failed));
    assert!(generator.prompts().is_empty());

    let stored = harness.store.get(id).await.unwrap();
    assert!(stored.error_message().as_deref().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_non_pending_record_is_skipped_untouched() {
    let harness = Harness::new();
    let generator = MockGenerator::new([MockBehavior::Succeed(GENERATED_BYTES.to_vec())]);
    let id = pending_capture(&harness).await;
    let worker = worker(&harness, &generator);

    assert!(matches!(worker.run(id).await, WorkerOutcome::Completed(_)));
    let before = harness.store.get(id).await.unwrap();

    let outcome = worker.run(id).await;
    assert_eq!(
        outcome,
        WorkerOutcome::Skipped {
            status: "completed".to_string()
        }
    );
    assert_eq!(harness.store.get(id).await.unwrap(), before);
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn test_unknown_record_is_abandoned() {
    let harness = Harness::new();
    let generator = MockGenerator::default();

    let outcome = worker(&harness, &generator).run(404).await;
    assert!(matches!(outcome, WorkerOutcome::Abandoned(message) if message.contains("not found")));
}

#[tokio::test]
async fn test_reconciled_worker_is_superseded() {
    let harness = Harness::new();
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let generator = MockGenerator::new([MockBehavior::Gate {
        started: started.clone(),
        release: release.clone(),
        bytes: GENERATED_BYTES.to_vec(),
    }]);
    let id = pending_capture(&harness).await;

    let worker = worker(&harness, &generator);
    let running = tokio::spawn(async move { worker.run(id).await });
    started.notified().await;

    let report = Reconciler::new(harness.store.clone())
        .reconcile(Duration::from_secs(3600), false, ReconcileScope::All)
        .await
        .unwrap();
    assert_eq!(report.affected, 1);

    release.notify_one();
    assert_eq!(running.await.unwrap(), WorkerOutcome::Superseded);

    let stored = harness.store.get(id).await.unwrap();
    assert_eq!(*stored.status(), ImageStatus::Failed);
    assert_eq!(stored.error_message().as_deref(), Some(ORPHANED_JOB_MESSAGE));
    assert!(stored.result_image_path().is_none());
    assert!(generated_files(&harness).is_empty());
}

#[tokio::test]
async fn test_retried_worker_cannot_overwrite_newer_attempt() {
    let harness = Harness::new();
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let generator = MockGenerator::new([
        MockBehavior::Gate {
            started: started.clone(),
            release: release.clone(),
            bytes: b"stale".to_vec(),
        },
        MockBehavior::Succeed(GENERATED_BYTES.to_vec()),
    ]);
    let id = pending_capture(&harness).await;

    let first = worker(&harness, &generator);
    let running = tokio::spawn(async move { first.run(id).await });
    started.notified().await;

    harness
        .store
        .update_status(id, &StatusUpdate::reset())
        .await
        .unwrap();
    let second = worker(&harness, &generator).run(id).await;
    let WorkerOutcome::Completed(fresh) = second else {
        panic!("expected completion, got {:?}", second);
    };
    assert_eq!(*fresh.attempt(), 2);

    release.notify_one();
    assert_eq!(running.await.unwrap(), WorkerOutcome::Superseded);
    assert_eq!(harness.store.get(id).await.unwrap(), fresh);
    assert_eq!(
        generated_files(&harness),
        vec![fresh.result_image_path().clone().unwrap()]
    );
}
