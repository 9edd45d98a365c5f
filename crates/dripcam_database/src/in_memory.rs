//! In-memory implementation of ImageRepository.
//!
//! Records live in a BTreeMap behind a single RwLock. Conditional updates
//! check their guard and write under the same write lock, which makes the
//! claim an atomic compare-and-set. All data is lost when the repository is
//! dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dripcam_core::{ImageFilter, ImageRequest, StatusUpdate};
use dripcam_error::{StorageError, StorageErrorKind};
use dripcam_interface::ImageRepository;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// In-memory repository for image requests.
///
/// Clones share the same underlying table.
#[derive(Debug, Clone)]
pub struct InMemoryImageRepository {
    /// Records keyed by id
    images: Arc<RwLock<BTreeMap<i64, ImageRequest>>>,
    /// Next id to assign
    next_id: Arc<RwLock<i64>>,
}

impl InMemoryImageRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            images: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Get the number of stored records.
    pub async fn len(&self) -> usize {
        self.images.read().await.len()
    }

    /// Check if the repository is empty.
    pub async fn is_empty(&self) -> bool {
        self.images.read().await.is_empty()
    }
}

impl Default for InMemoryImageRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(a: &ImageRequest, b: &ImageRequest) -> std::cmp::Ordering {
    b.created_at()
        .cmp(a.created_at())
        .then_with(|| b.id().cmp(a.id()))
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    #[instrument(skip(self))]
    async fn create(
        &self,
        source_image_path: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ImageRequest, StorageError> {
        let mut next_id_guard = self.next_id.write().await;
        let id = *next_id_guard;
        *next_id_guard += 1;
        drop(next_id_guard);

        let image = ImageRequest::new_pending(id, source_image_path, created_at);
        self.images.write().await.insert(id, image.clone());
        debug!(id, "Created image request");
        Ok(image)
    }

    async fn get(&self, id: i64) -> Result<ImageRequest, StorageError> {
        self.images
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(id)))
    }

    #[instrument(skip(self, update), fields(target = %update.status()))]
    async fn update_status(
        &self,
        id: i64,
        update: &StatusUpdate,
    ) -> Result<ImageRequest, StorageError> {
        update.validate()?;

        let mut images = self.images.write().await;
        let image = images
            .get_mut(&id)
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(id)))?;

        if !update.permits(image) {
            debug!(id, current = %image.status(), "Update guard rejected");
            return Err(StorageError::new(StorageErrorKind::Conflict {
                id,
                current: image.status().to_string(),
            }));
        }

        image.apply(update, Utc::now());
        Ok(image.clone())
    }

    async fn query(&self, filter: &ImageFilter) -> Result<Vec<ImageRequest>, StorageError> {
        let images = self.images.read().await;
        let mut results: Vec<ImageRequest> = images
            .values()
            .filter(|image| filter.matches(image))
            .cloned()
            .collect();
        drop(images);

        results.sort_by(newest_first);

        let offset = filter.offset.unwrap_or(0);
        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(results.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &ImageFilter) -> Result<usize, StorageError> {
        let images = self.images.read().await;
        Ok(images.values().filter(|image| filter.matches(image)).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dripcam_core::ImageStatus;

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryImageRepository::new();
        let image = repo.create("webcam/a.jpg", Utc::now()).await.unwrap();
        assert_eq!(*image.id(), 1);
        assert_eq!(*image.status(), ImageStatus::Pending);

        let loaded = repo.get(1).await.unwrap();
        assert_eq!(loaded, image);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let repo = InMemoryImageRepository::new();
        let err = repo.get(999).await.unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::NotFound(999));
    }

    #[tokio::test]
    async fn test_guard_conflict_leaves_record_untouched() {
        let repo = InMemoryImageRepository::new();
        let image = repo.create("webcam/a.jpg", Utc::now()).await.unwrap();

        let err = repo
            .update_status(*image.id(), &StatusUpdate::complete("generated/a.png", 1))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.get(*image.id()).await.unwrap(), image);
    }

    #[tokio::test]
    async fn test_invalid_update_rejected() {
        let repo = InMemoryImageRepository::new();
        let image = repo.create("webcam/a.jpg", Utc::now()).await.unwrap();

        let err = repo
            .update_status(*image.id(), &StatusUpdate::new(ImageStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, StorageErrorKind::InvalidUpdate(_)));
    }

    #[tokio::test]
    async fn test_query_orders_newest_first_and_paginates() {
        let repo = InMemoryImageRepository::new();
        let now = Utc::now();
        for hours in [3, 1, 2] {
            repo.create(&format!("webcam/{}.jpg", hours), now - Duration::hours(hours))
                .await
                .unwrap();
        }

        let all = repo.query(&ImageFilter::new()).await.unwrap();
        let paths: Vec<&str> = all.iter().map(|i| i.source_image_path().as_str()).collect();
        assert_eq!(paths, vec!["webcam/1.jpg", "webcam/2.jpg", "webcam/3.jpg"]);

        let page = repo
            .query(&ImageFilter::new().with_offset(1).with_limit(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].source_image_path(), "webcam/2.jpg");

        assert_eq!(repo.count(&ImageFilter::new().with_limit(1)).await.unwrap(), 3);
    }
}
