//! Image record persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dripcam_core::{ImageFilter, ImageRequest, StatusUpdate};
use dripcam_error::StorageError;

/// Persistent table of image generation requests.
///
/// Implementations must apply [`StatusUpdate`]s atomically: the guard check
/// and the write happen as one step, so two concurrent claims of the same
/// pending record cannot both succeed.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Insert a new pending record.
    async fn create(
        &self,
        source_image_path: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ImageRequest, StorageError>;

    /// Fetch a record by id.
    ///
    /// Returns a `NotFound` error for unknown ids.
    async fn get(&self, id: i64) -> Result<ImageRequest, StorageError>;

    /// Conditionally transition a record and return its new state.
    ///
    /// Returns `NotFound` for unknown ids, `Conflict` when the update's
    /// guard does not accept the current state and `InvalidUpdate` when the
    /// payload would break a record invariant.
    async fn update_status(
        &self,
        id: i64,
        update: &StatusUpdate,
    ) -> Result<ImageRequest, StorageError>;

    /// Records matching `filter`, newest first.
    async fn query(&self, filter: &ImageFilter) -> Result<Vec<ImageRequest>, StorageError>;

    /// Number of records matching `filter`, ignoring offset and limit.
    async fn count(&self, filter: &ImageFilter) -> Result<usize, StorageError>;
}
