//! The generation worker.

use crate::{ImageStore, PipelineMetrics};
use dripcam_core::{ImageRequest, ImageStatus, StatusUpdate};
use dripcam_error::{DripcamError, StorageErrorKind};
use dripcam_interface::{ImageGenerator, MediaKind, MediaStore};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// How one worker invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Record reached `completed`
    Completed(ImageRequest),
    /// Record reached `failed`
    Failed(ImageRequest),
    /// Claim was rejected; nothing was changed
    Skipped {
        /// Status the record was in
        status: String,
    },
    /// Terminal update rejected because the record moved on (reconciled or retried)
    Superseded,
    /// A storage fault kept the worker from recording any result
    Abandoned(String),
}

impl WorkerOutcome {
    /// Status the worker left the record in, if it wrote a terminal state.
    pub fn terminal_status(&self) -> Option<ImageStatus> {
        match self {
            WorkerOutcome::Completed(image) | WorkerOutcome::Failed(image) => Some(*image.status()),
            _ => None,
        }
    }
}

/// Runs one generation for one record.
///
/// Failures never escape: every error or panic after the claim becomes a
/// `failed` record, fenced by the claimed attempt so a worker that was
/// reconciled or retried away cannot overwrite the newer state.
#[derive(Clone)]
pub struct GenerationWorker {
    store: ImageStore,
    media: Arc<dyn MediaStore>,
    generator: Arc<dyn ImageGenerator>,
    prompt: String,
    metrics: PipelineMetrics,
}

impl std::fmt::Debug for GenerationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationWorker")
            .field("provider", &self.generator.provider_name())
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

impl GenerationWorker {
    /// Create a worker that sends `prompt` with every capture.
    pub fn new(
        store: ImageStore,
        media: Arc<dyn MediaStore>,
        generator: Arc<dyn ImageGenerator>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            store,
            media,
            generator,
            prompt: prompt.into(),
            metrics: PipelineMetrics::default(),
        }
    }

    /// Record generation metrics on `metrics`.
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Claim record `id` and drive it to a terminal state.
    #[instrument(skip(self), fields(provider = self.generator.provider_name()))]
    pub async fn run(&self, id: i64) -> WorkerOutcome {
        let claimed = match self
            .store
            .update_status(id, &StatusUpdate::claim(self.prompt.as_str()))
            .await
        {
            Ok(image) => image,
            Err(e) => {
                return match &e.kind {
                    StorageErrorKind::Conflict { current, .. } => {
                        debug!(current = %current, "Record not pending, skipping");
                        WorkerOutcome::Skipped {
                            status: current.clone(),
                        }
                    }
                    kind => {
                        error!(error = %e, "Failed to claim image request");
                        WorkerOutcome::Abandoned(kind.to_string())
                    }
                };
            }
        };

        let attempt = *claimed.attempt();
        debug!(attempt, "Claimed image request");
        let started = Instant::now();

        let mut produced = None;
        let update = match AssertUnwindSafe(self.produce(&claimed)).catch_unwind().await {
            Ok(Ok(result_path)) => {
                produced = Some(result_path.clone());
                StatusUpdate::complete(result_path, attempt)
            }
            Ok(Err(e)) => {
                error!(error = %e, attempt, "Image generation failed");
                StatusUpdate::fail(e.diagnostic(), attempt)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, attempt, "Generation worker panicked");
                StatusUpdate::fail(format!("Worker panicked: {}", message), attempt)
            }
        };

        match self.store.update_status(id, &update).await {
            Ok(image) => {
                let completed = *image.status() == ImageStatus::Completed;
                self.metrics.record_generation(
                    self.generator.provider_name(),
                    completed,
                    started.elapsed().as_secs_f64(),
                );
                if completed {
                    info!(
                        attempt,
                        result = image.result_image_path().as_deref().unwrap_or_default(),
                        "Image generation completed"
                    );
                    WorkerOutcome::Completed(image)
                } else {
                    WorkerOutcome::Failed(image)
                }
            }
            Err(e) if e.is_conflict() => {
                warn!(attempt, error = %e, "Record changed during generation, result discarded");
                if let Some(path) = produced {
                    self.discard(&path).await;
                }
                WorkerOutcome::Superseded
            }
            Err(e) => {
                error!(attempt, error = %e, "Failed to record generation result");
                WorkerOutcome::Abandoned(e.kind.to_string())
            }
        }
    }

    /// Load the capture, generate, and store the result. Returns the result path.
    async fn produce(&self, image: &ImageRequest) -> Result<String, DripcamError> {
        let source = self.media.load(image.source_image_path()).await?;
        let prompt = image.prompt().as_deref().unwrap_or(&self.prompt);
        let generated = self.generator.generate(&source, prompt).await?;
        Ok(self.media.store(MediaKind::Generated, &generated).await?)
    }

    /// Delete a generated file that no record will reference.
    async fn discard(&self, path: &str) {
        match self.media.remove(path).await {
            Ok(()) => debug!(path, "Removed unreferenced generated image"),
            Err(e) => warn!(path, error = %e, "Failed to remove unreferenced generated image"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
