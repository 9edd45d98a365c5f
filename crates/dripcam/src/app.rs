//! Wiring from settings to running components.

use dripcam_core::Settings;
use dripcam_database::{PostgresImageRepository, create_pool, run_migrations};
use dripcam_error::{ConfigError, DripcamResult};
use dripcam_interface::ImageRepository;
use dripcam_models::GeminiImageClient;
use dripcam_pipeline::{
    GenerationWorker, ImageEvents, ImageStore, Pipeline, PipelineMetrics, Reconciler,
    TokioDispatcher,
};
use dripcam_storage::FileMediaStore;
use std::sync::Arc;
use tracing::{info, instrument};

/// Store, media and settings shared by every command.
#[derive(Debug, Clone)]
pub struct App {
    settings: Settings,
    store: ImageStore,
    media: Arc<FileMediaStore>,
    metrics: PipelineMetrics,
}

impl App {
    /// Connect to PostgreSQL, apply migrations and open the media root.
    ///
    /// # Errors
    ///
    /// A configuration error when no database URL is set or the pool size
    /// is zero, or a storage
    /// error when the database is unreachable or migrations fail.
    #[instrument(skip_all)]
    pub fn connect(settings: Settings) -> DripcamResult<Self> {
        let url = settings.database.url.clone().ok_or_else(|| {
            ConfigError::new("Database URL not configured (set DATABASE_URL or DRIPCAM__DATABASE__URL)")
        })?;

        if settings.database.pool_size == 0 {
            return Err(ConfigError::new("Database pool size must be at least 1").into());
        }

        let pool = create_pool(&url, settings.database.pool_size)?;
        run_migrations(&pool)?;
        info!(media_root = %settings.media.root.display(), "Connected to image store");

        Ok(Self::with_repository(
            settings,
            Arc::new(PostgresImageRepository::new(pool)),
        ))
    }

    /// Assemble over an existing repository.
    pub fn with_repository(settings: Settings, repository: Arc<dyn ImageRepository>) -> Self {
        let store = ImageStore::new(repository, ImageEvents::default());
        let media = Arc::new(FileMediaStore::new(settings.media.root.clone()));
        Self {
            settings,
            store,
            media,
            metrics: PipelineMetrics::default(),
        }
    }

    /// Loaded settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The record store.
    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// A reconciler over the record store.
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.store.clone()).with_metrics(self.metrics.clone())
    }

    /// A pipeline backed by the Gemini client, plus its dispatcher for draining.
    ///
    /// # Errors
    ///
    /// A generation error when the provider client cannot be configured,
    /// most commonly a missing API key.
    pub fn pipeline(&self) -> DripcamResult<(Pipeline, Arc<TokioDispatcher>)> {
        let generator = GeminiImageClient::new(&self.settings.provider)?;
        let worker = GenerationWorker::new(
            self.store.clone(),
            self.media.clone(),
            Arc::new(generator),
            self.settings.generation.prompt.clone(),
        )
        .with_metrics(self.metrics.clone());

        let dispatcher = Arc::new(TokioDispatcher::new(
            worker,
            self.settings.worker.max_concurrent,
        ));
        let pipeline = Pipeline::new(self.store.clone(), self.media.clone(), dispatcher.clone())
            .with_metrics(self.metrics.clone());
        Ok((pipeline, dispatcher))
    }
}
