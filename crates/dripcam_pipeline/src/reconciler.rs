//! Stuck-job reconciliation.

use crate::{ImageStore, PipelineMetrics};
use chrono::{DateTime, Utc};
use dripcam_core::{ImageFilter, ImageRequest, ImageSnapshot, ImageStatus, StatusUpdate};
use dripcam_error::StorageError;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

/// Which in-flight records a sweep considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReconcileScope {
    /// Only records older than the age threshold
    #[default]
    Recent,
    /// Every in-flight record regardless of age
    All,
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records selected, as they were before the sweep
    pub candidates: Vec<ImageSnapshot>,
    /// Records marked failed, or that would be under a dry run
    pub affected: usize,
    /// Whether the sweep only reported
    pub dry_run: bool,
}

/// Force-fails records whose worker never reached a terminal state.
///
/// A record qualifies when it is `pending` or `processing`, has no result
/// image and (for [`ReconcileScope::Recent`]) was created before the age
/// threshold. Each record is updated on its own, guarded on still being in
/// flight, so a worker finishing concurrently wins cleanly.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: ImageStore,
    metrics: PipelineMetrics,
}

impl Reconciler {
    /// Create a reconciler over `store`.
    pub fn new(store: ImageStore) -> Self {
        Self {
            store,
            metrics: PipelineMetrics::default(),
        }
    }

    /// Record reconciliation metrics on `metrics`.
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Select stuck records, newest first.
    #[instrument(skip(self))]
    pub async fn find_stuck(
        &self,
        scope: ReconcileScope,
        max_age: Duration,
    ) -> Result<Vec<ImageRequest>, StorageError> {
        let mut filter = ImageFilter::new()
            .with_statuses(&ImageStatus::IN_FLIGHT)
            .without_result();

        if scope == ReconcileScope::Recent {
            filter = filter.created_before(cutoff(Utc::now(), max_age));
        }

        let stuck = self.store.query(&filter).await?;
        debug!(count = stuck.len(), "Found stuck image requests");
        Ok(stuck)
    }

    /// Mark each candidate failed with the orphaned-job diagnostic.
    ///
    /// Candidates that reached a terminal state since they were selected are
    /// left alone. Returns the records actually updated.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn fail_stuck(
        &self,
        candidates: &[ImageRequest],
    ) -> Result<Vec<ImageRequest>, StorageError> {
        let mut failed = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let id = *candidate.id();
            match self.store.update_status(id, &StatusUpdate::orphaned()).await {
                Ok(image) => {
                    warn!(id, previous = %candidate.status(), "Marked stuck image request as failed");
                    failed.push(image);
                }
                Err(e) if e.is_conflict() => {
                    debug!(id, error = %e, "Image request finished before reconciliation");
                }
                Err(e) => {
                    error!(id, error = %e, "Failed to mark image request as failed");
                    return Err(e);
                }
            }
        }

        self.metrics.record_reconciled(failed.len());
        Ok(failed)
    }

    /// Find stuck records and, unless `dry_run`, fail them.
    #[instrument(skip(self))]
    pub async fn reconcile(
        &self,
        max_age: Duration,
        dry_run: bool,
        scope: ReconcileScope,
    ) -> Result<ReconcileReport, StorageError> {
        let stuck = self.find_stuck(scope, max_age).await?;
        let candidates: Vec<ImageSnapshot> = stuck.iter().map(ImageSnapshot::from).collect();

        let affected = if dry_run {
            stuck.len()
        } else {
            self.fail_stuck(&stuck).await?.len()
        };

        Ok(ReconcileReport {
            candidates,
            affected,
            dry_run,
        })
    }

    /// Sweep `Recent` records every `interval` until the task is aborted.
    ///
    /// The first sweep runs immediately. Faults are logged and the loop
    /// carries on.
    pub fn spawn_periodic(&self, interval: Duration, max_age: Duration) -> JoinHandle<()> {
        let reconciler = self.clone();
        let period = interval.max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = period.as_secs(), max_age_secs = max_age.as_secs(), "Starting periodic reconciler");

            loop {
                ticker.tick().await;
                match reconciler
                    .reconcile(max_age, false, ReconcileScope::Recent)
                    .await
                {
                    Ok(report) if report.affected > 0 => {
                        info!(affected = report.affected, "Reconciler sweep failed stuck jobs");
                    }
                    Ok(_) => debug!("Reconciler sweep found nothing"),
                    Err(e) => error!(error = %e, "Reconciler sweep failed"),
                }
            }
        })
    }
}

/// Instant `max_age` before `now`, saturating at the earliest representable time.
fn cutoff(now: DateTime<Utc>, max_age: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(max_age)
        .ok()
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
