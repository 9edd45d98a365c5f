//! Image request status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an image request.
///
/// Stored and broadcast as its lowercase name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageStatus {
    /// Waiting for a worker to claim it
    Pending,
    /// Claimed by a worker, provider call in flight
    Processing,
    /// Generated image stored
    Completed,
    /// Generation failed, may be retried
    Failed,
}

impl ImageStatus {
    /// Statuses a record can be stuck in when its worker disappears.
    pub const IN_FLIGHT: [ImageStatus; 2] = [ImageStatus::Pending, ImageStatus::Processing];

    /// Whether no worker will move the record further on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, ImageStatus::Completed | ImageStatus::Failed)
    }
}
