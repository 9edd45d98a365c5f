//! Change notification payloads.

use crate::{ImageRequest, ImageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of persisted change produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    /// Record was created
    Created,
    /// Record status or fields were updated
    Updated,
}

/// Immutable copy of an image request at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSnapshot {
    /// Record id
    pub id: i64,
    /// Prompt sent to the provider, if claimed
    pub prompt: Option<String>,
    /// Media path of the webcam capture
    pub source_image_path: String,
    /// Media path of the generated image
    pub result_image_path: Option<String>,
    /// Status at publish time
    pub status: ImageStatus,
    /// Failure diagnostic
    pub error_message: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the change
    pub updated_at: DateTime<Utc>,
    /// Claim counter at publish time
    pub attempt: u32,
}

impl From<&ImageRequest> for ImageSnapshot {
    fn from(image: &ImageRequest) -> Self {
        Self {
            id: *image.id(),
            prompt: image.prompt().clone(),
            source_image_path: image.source_image_path().clone(),
            result_image_path: image.result_image_path().clone(),
            status: *image.status(),
            error_message: image.error_message().clone(),
            created_at: *image.created_at(),
            updated_at: *image.updated_at(),
            attempt: *image.attempt(),
        }
    }
}

/// A broadcast record change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEvent {
    /// Creation or update
    pub change: ChangeKind,
    /// Record state after the change
    pub image: ImageSnapshot,
}

impl ImageEvent {
    /// Event for a newly created record.
    pub fn created(image: &ImageRequest) -> Self {
        Self {
            change: ChangeKind::Created,
            image: image.into(),
        }
    }

    /// Event for an updated record.
    pub fn updated(image: &ImageRequest) -> Self {
        Self {
            change: ChangeKind::Updated,
            image: image.into(),
        }
    }
}
