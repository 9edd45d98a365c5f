//! Record store with change publication.

use crate::ImageEvents;
use chrono::Utc;
use dripcam_core::{ImageEvent, ImageFilter, ImageRequest, ImageStatus, Page, StatusUpdate};
use dripcam_error::StorageError;
use dripcam_interface::ImageRepository;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing::instrument;

/// The pipeline's only write path to the record store.
///
/// Every successful create or update is published on [`ImageEvents`] after
/// it is persisted. Writes and their publishes are serialized, so
/// subscribers see changes to a record in the order they were stored.
#[derive(Clone)]
pub struct ImageStore {
    repository: Arc<dyn ImageRepository>,
    events: ImageEvents,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("subscribers", &self.events.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl ImageStore {
    /// Wrap a repository, publishing on `events`.
    pub fn new(repository: Arc<dyn ImageRepository>, events: ImageEvents) -> Self {
        Self {
            repository,
            events,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The notification channel.
    pub fn events(&self) -> &ImageEvents {
        &self.events
    }

    /// Subscribe to changes persisted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ImageEvent> {
        self.events.subscribe()
    }

    /// Create a `pending` record for a stored capture.
    #[instrument(skip(self))]
    pub async fn create(&self, source_image_path: &str) -> Result<ImageRequest, StorageError> {
        let _guard = self.write_lock.lock().await;
        let image = self.repository.create(source_image_path, Utc::now()).await?;
        self.events.publish(ImageEvent::created(&image));
        Ok(image)
    }

    /// Apply a guarded status transition.
    #[instrument(skip(self, update), fields(target = %update.status()))]
    pub async fn update_status(
        &self,
        id: i64,
        update: &StatusUpdate,
    ) -> Result<ImageRequest, StorageError> {
        let _guard = self.write_lock.lock().await;
        let image = self.repository.update_status(id, update).await?;
        self.events.publish(ImageEvent::updated(&image));
        Ok(image)
    }

    /// Fetch one record.
    pub async fn get(&self, id: i64) -> Result<ImageRequest, StorageError> {
        self.repository.get(id).await
    }

    /// Records matching `filter`, newest first.
    pub async fn query(&self, filter: &ImageFilter) -> Result<Vec<ImageRequest>, StorageError> {
        self.repository.query(filter).await
    }

    /// Number of records matching `filter`.
    pub async fn count(&self, filter: &ImageFilter) -> Result<usize, StorageError> {
        self.repository.count(filter).await
    }

    /// One page of records, newest first. `page` is 1-based; 0 reads as 1.
    pub async fn page(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<Page<ImageRequest>, StorageError> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let total = self.count(&ImageFilter::new()).await?;
        let items = self
            .query(
                &ImageFilter::new()
                    .with_offset((page - 1).saturating_mul(page_size))
                    .with_limit(page_size),
            )
            .await?;

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Number of records in any of `statuses` (all records if empty).
    pub async fn count_by_status(&self, statuses: &[ImageStatus]) -> Result<usize, StorageError> {
        self.count(&ImageFilter::new().with_statuses(statuses)).await
    }
}
