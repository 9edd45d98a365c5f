//! Guarded status updates.

use crate::{ImageRequest, ImageStatus};
use derive_getters::Getters;
use dripcam_error::{StorageError, StorageErrorKind};

/// Diagnostic written by the reconciler onto abandoned jobs.
pub const ORPHANED_JOB_MESSAGE: &str = "Job timed out or failed without proper error handling";

/// A conditional status transition for one image request.
///
/// The update only applies when the record's current status is in
/// `expected` (empty means any status) and, when `expected_attempt` is set,
/// the record's attempt counter matches it.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StatusUpdate {
    /// Target status
    status: ImageStatus,
    /// Statuses the record must currently be in
    expected: Vec<ImageStatus>,
    /// Attempt the record must currently be on
    expected_attempt: Option<u32>,
    /// Replacement prompt
    prompt: Option<String>,
    /// Generated image path, required for `Completed`
    result_image_path: Option<String>,
    /// Failure diagnostic, required for `Failed`
    error_message: Option<String>,
}

impl StatusUpdate {
    /// Unguarded update to `status` with no payload.
    pub fn new(status: ImageStatus) -> Self {
        Self {
            status,
            expected: Vec::new(),
            expected_attempt: None,
            prompt: None,
            result_image_path: None,
            error_message: None,
        }
    }

    /// Exclusive claim of a pending record by a worker.
    pub fn claim(prompt: impl Into<String>) -> Self {
        Self::new(ImageStatus::Processing)
            .when(&[ImageStatus::Pending])
            .with_prompt(prompt)
    }

    /// Successful completion by the worker holding `attempt`.
    pub fn complete(result_image_path: impl Into<String>, attempt: u32) -> Self {
        Self::new(ImageStatus::Completed)
            .when(&[ImageStatus::Processing])
            .on_attempt(attempt)
            .with_result_image_path(result_image_path)
    }

    /// Failure reported by the worker holding `attempt`.
    pub fn fail(message: impl Into<String>, attempt: u32) -> Self {
        Self::new(ImageStatus::Failed)
            .when(&[ImageStatus::Processing])
            .on_attempt(attempt)
            .with_error_message(message)
    }

    /// Put a record back in the queue, whatever its status.
    pub fn reset() -> Self {
        Self::new(ImageStatus::Pending)
    }

    /// Force-fail a record abandoned in flight.
    pub fn orphaned() -> Self {
        Self::new(ImageStatus::Failed)
            .when(&ImageStatus::IN_FLIGHT)
            .with_error_message(ORPHANED_JOB_MESSAGE)
    }

    /// Require the current status to be one of `statuses`.
    pub fn when(mut self, statuses: &[ImageStatus]) -> Self {
        self.expected = statuses.to_vec();
        self
    }

    /// Require the current attempt counter to equal `attempt`.
    pub fn on_attempt(mut self, attempt: u32) -> Self {
        self.expected_attempt = Some(attempt);
        self
    }

    /// Set the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the generated image path.
    pub fn with_result_image_path(mut self, path: impl Into<String>) -> Self {
        self.result_image_path = Some(path.into());
        self
    }

    /// Set the failure diagnostic.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Whether the transition moves the attempt counter forward.
    pub fn bumps_attempt(&self) -> bool {
        self.status == ImageStatus::Processing
    }

    /// Reject payloads that would break the record invariants.
    #[track_caller]
    pub fn validate(&self) -> Result<(), StorageError> {
        let invalid = |msg: String| Err(StorageError::new(StorageErrorKind::InvalidUpdate(msg)));
        match self.status {
            ImageStatus::Completed if self.result_image_path.as_deref().is_none_or(str::is_empty) => {
                invalid("completed requires a result image path".to_string())
            }
            ImageStatus::Failed if self.error_message.as_deref().is_none_or(str::is_empty) => {
                invalid("failed requires an error message".to_string())
            }
            status if status != ImageStatus::Completed && self.result_image_path.is_some() => {
                invalid(format!("{} cannot carry a result image path", status))
            }
            status if status != ImageStatus::Failed && self.error_message.is_some() => {
                invalid(format!("{} cannot carry an error message", status))
            }
            _ => Ok(()),
        }
    }

    /// Whether the guard accepts the record's current state.
    pub fn permits(&self, current: &ImageRequest) -> bool {
        let status_ok = self.expected.is_empty() || self.expected.contains(current.status());
        let attempt_ok = self
            .expected_attempt
            .is_none_or(|attempt| attempt == *current.attempt());
        status_ok && attempt_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_named_updates_are_valid() {
        assert!(StatusUpdate::claim("p").validate().is_ok());
        assert!(StatusUpdate::complete("generated/x.png", 1).validate().is_ok());
        assert!(StatusUpdate::fail("boom", 1).validate().is_ok());
        assert!(StatusUpdate::reset().validate().is_ok());
        assert!(StatusUpdate::orphaned().validate().is_ok());
    }

    #[test]
    fn test_invalid_payloads_rejected() {
        assert!(StatusUpdate::new(ImageStatus::Completed).validate().is_err());
        assert!(StatusUpdate::new(ImageStatus::Failed).validate().is_err());
        assert!(
            StatusUpdate::new(ImageStatus::Failed)
                .with_error_message("")
                .validate()
                .is_err()
        );
        assert!(
            StatusUpdate::new(ImageStatus::Pending)
                .with_error_message("stale")
                .validate()
                .is_err()
        );
        assert!(
            StatusUpdate::new(ImageStatus::Failed)
                .with_error_message("x")
                .with_result_image_path("generated/x.png")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_guard_checks_status_and_attempt() {
        let now = Utc::now();
        let mut image = ImageRequest::new_pending(1, "webcam/a.jpg", now);
        assert!(StatusUpdate::claim("p").permits(&image));
        assert!(!StatusUpdate::complete("g.png", 1).permits(&image));

        image.apply(&StatusUpdate::claim("p"), now);
        assert!(!StatusUpdate::claim("p").permits(&image));
        assert!(StatusUpdate::complete("g.png", 1).permits(&image));
        assert!(!StatusUpdate::complete("g.png", 2).permits(&image));
        assert!(StatusUpdate::orphaned().permits(&image));
        assert!(StatusUpdate::reset().permits(&image));
    }
}
