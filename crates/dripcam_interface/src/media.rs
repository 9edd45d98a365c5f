//! Media file storage.

use async_trait::async_trait;
use dripcam_error::MediaError;
use serde::{Deserialize, Serialize};

/// Which side of the pipeline a media file belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    /// Original webcam capture
    #[strum(serialize = "webcam")]
    Capture,
    /// Provider output
    Generated,
}

/// Stores image bytes and hands back relative paths for the record store.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist `bytes` and return the relative path they were written to.
    async fn store(&self, kind: MediaKind, bytes: &[u8]) -> Result<String, MediaError>;

    /// Read the bytes at a relative path previously returned by `store`.
    async fn load(&self, path: &str) -> Result<Vec<u8>, MediaError>;

    /// Delete the file at a relative path previously returned by `store`.
    async fn remove(&self, path: &str) -> Result<(), MediaError>;
}
