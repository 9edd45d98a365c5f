//! The image request record.

use crate::{ImageStatus, StatusUpdate};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One webcam capture moving through the generation pipeline.
///
/// Records are only constructed by a store. Field invariants:
/// - `result_image_path` is set iff `status` is `Completed`
/// - `error_message` is set only when `status` is `Failed`
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Store-assigned identifier
    id: i64,
    /// Current lifecycle status
    #[builder(default = "ImageStatus::Pending")]
    status: ImageStatus,
    /// Media path of the captured webcam image
    source_image_path: String,
    /// Media path of the generated image
    #[builder(default)]
    result_image_path: Option<String>,
    /// Prompt sent to the provider
    #[builder(default)]
    prompt: Option<String>,
    /// Failure diagnostic
    #[builder(default)]
    error_message: Option<String>,
    /// Creation time
    created_at: DateTime<Utc>,
    /// Time of the last persisted change
    updated_at: DateTime<Utc>,
    /// Number of times a worker has claimed this record
    #[builder(default)]
    attempt: u32,
}

impl ImageRequest {
    /// Create a fresh pending record.
    pub fn new_pending(id: i64, source_image_path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: ImageStatus::Pending,
            source_image_path: source_image_path.into(),
            result_image_path: None,
            prompt: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            attempt: 0,
        }
    }

    /// Start a builder for rehydrating a stored record.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }

    /// Apply an already validated and guarded update in place.
    ///
    /// Nullable fields are derived from the target status so the record
    /// invariants hold regardless of the payload.
    pub fn apply(&mut self, update: &StatusUpdate, now: DateTime<Utc>) {
        let status = *update.status();
        if status == ImageStatus::Processing {
            self.attempt += 1;
        }
        self.status = status;
        self.result_image_path = match status {
            ImageStatus::Completed => update.result_image_path().clone(),
            _ => None,
        };
        self.error_message = match status {
            ImageStatus::Failed => update.error_message().clone(),
            _ => None,
        };
        if let Some(prompt) = update.prompt() {
            self.prompt = Some(prompt.clone());
        }
        self.updated_at = now;
    }

    /// Whether the record satisfies the status/field invariants.
    pub fn is_consistent(&self) -> bool {
        let result_ok = self.result_image_path.is_some() == (self.status == ImageStatus::Completed);
        let error_ok = self.error_message.is_none() || self.status == ImageStatus::Failed;
        result_ok && error_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_pending_and_empty() {
        let image = ImageRequest::new_pending(1, "webcam/a.jpg", Utc::now());
        assert_eq!(*image.status(), ImageStatus::Pending);
        assert!(image.result_image_path().is_none());
        assert!(image.error_message().is_none());
        assert_eq!(*image.attempt(), 0);
        assert!(image.is_consistent());
    }

    #[test]
    fn test_apply_lifecycle() {
        let now = Utc::now();
        let mut image = ImageRequest::new_pending(1, "webcam/a.jpg", now);

        image.apply(&StatusUpdate::claim("add chains"), now);
        assert_eq!(*image.status(), ImageStatus::Processing);
        assert_eq!(image.prompt().as_deref(), Some("add chains"));
        assert_eq!(*image.attempt(), 1);

        image.apply(&StatusUpdate::fail("boom", 1), now);
        assert_eq!(*image.status(), ImageStatus::Failed);
        assert_eq!(image.error_message().as_deref(), Some("boom"));
        assert!(image.is_consistent());

        image.apply(&StatusUpdate::reset(), now);
        assert_eq!(*image.status(), ImageStatus::Pending);
        assert!(image.error_message().is_none());
        assert_eq!(image.prompt().as_deref(), Some("add chains"));

        image.apply(&StatusUpdate::claim("add chains"), now);
        image.apply(&StatusUpdate::complete("generated/x.png", 2), now);
        assert_eq!(*image.status(), ImageStatus::Completed);
        assert_eq!(image.result_image_path().as_deref(), Some("generated/x.png"));
        assert!(image.error_message().is_none());
        assert!(image.is_consistent());
    }

    #[test]
    fn test_reset_clears_previous_result() {
        let now = Utc::now();
        let mut image = ImageRequest::new_pending(1, "webcam/a.jpg", now);
        image.apply(&StatusUpdate::claim("p"), now);
        image.apply(&StatusUpdate::complete("generated/x.png", 1), now);

        image.apply(&StatusUpdate::reset(), now);
        assert!(image.result_image_path().is_none());
        assert!(image.is_consistent());
    }

    #[test]
    fn test_builder_rehydrates_record() {
        let now = Utc::now();
        let image = ImageRequest::builder()
            .id(9)
            .status(ImageStatus::Failed)
            .source_image_path("webcam/b.jpg")
            .error_message(Some("nope".to_string()))
            .created_at(now)
            .updated_at(now)
            .attempt(3u32)
            .build()
            .unwrap();
        assert_eq!(*image.id(), 9);
        assert!(image.is_consistent());
    }
}
