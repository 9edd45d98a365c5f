//! Dispatch, retry and query entry points.

use crate::{Dispatcher, ImageStore, PipelineMetrics};
use dripcam_core::{ImageEvent, ImageRequest, ImageStatus, Page, StatusUpdate};
use dripcam_error::DripcamResult;
use dripcam_interface::{MediaKind, MediaStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Gallery page size when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Front door of the pipeline.
#[derive(Clone)]
pub struct Pipeline {
    store: ImageStore,
    media: Arc<dyn MediaStore>,
    dispatcher: Arc<dyn Dispatcher>,
    metrics: PipelineMetrics,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Assemble a pipeline.
    pub fn new(
        store: ImageStore,
        media: Arc<dyn MediaStore>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            store,
            media,
            dispatcher,
            metrics: PipelineMetrics::default(),
        }
    }

    /// Record submission metrics on `metrics`.
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// The underlying record store.
    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Store a capture, create its record and schedule generation.
    ///
    /// Returns once the worker is scheduled, not when it finishes.
    #[instrument(skip(self, source_image), fields(bytes = source_image.len()))]
    pub async fn submit(&self, source_image: &[u8]) -> DripcamResult<i64> {
        let path = self.media.store(MediaKind::Capture, source_image).await?;
        let image = self.store.create(&path).await?;
        let id = *image.id();

        self.metrics.record_submission();
        self.dispatcher.dispatch(id).await;
        info!(id, source = %path, "Submitted capture for generation");
        Ok(id)
    }

    /// Reset a record to `pending` and schedule one new generation.
    ///
    /// Allowed from any status. Clears the error message and result path.
    #[instrument(skip(self))]
    pub async fn retry(&self, id: i64) -> DripcamResult<ImageRequest> {
        let image = self.store.update_status(id, &StatusUpdate::reset()).await?;
        self.dispatcher.dispatch(id).await;
        info!(id, attempt = image.attempt(), "Retrying image generation");
        Ok(image)
    }

    /// Fetch one record.
    pub async fn get(&self, id: i64) -> DripcamResult<ImageRequest> {
        Ok(self.store.get(id).await?)
    }

    /// One page of records, newest first. `page` is 1-based.
    pub async fn list(&self, page: usize, page_size: usize) -> DripcamResult<Page<ImageRequest>> {
        Ok(self.store.page(page, page_size).await?)
    }

    /// Number of records in any of `statuses` (all records if empty).
    pub async fn count_by_status(&self, statuses: &[ImageStatus]) -> DripcamResult<usize> {
        Ok(self.store.count_by_status(statuses).await?)
    }

    /// Receive every change persisted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ImageEvent> {
        self.store.subscribe()
    }
}
