//! Scheduling of worker invocations.

use crate::{GenerationWorker, WorkerOutcome};
use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info_span};

/// Schedules a generation for a record without waiting for it.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Schedule one worker invocation for record `id`.
    async fn dispatch(&self, id: i64);
}

/// Runs each worker invocation as its own tokio task.
///
/// At most `max_concurrent` workers run at once; the rest wait for a
/// permit. Handles of finished workers are dropped on the next dispatch, so
/// only unfinished work (and work finished since the last dispatch) is
/// tracked. Workers log their own outcome either way.
#[derive(Debug, Clone)]
pub struct TokioDispatcher {
    worker: GenerationWorker,
    permits: Arc<Semaphore>,
    handles: Arc<Mutex<Vec<JoinHandle<WorkerOutcome>>>>,
}

impl TokioDispatcher {
    /// Create a dispatcher running `worker` with bounded concurrency.
    pub fn new(worker: GenerationWorker, max_concurrent: usize) -> Self {
        Self {
            worker,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of scheduled invocations that have not finished.
    pub async fn in_flight(&self) -> usize {
        self.handles
            .lock()
            .await
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Number of join handles currently held.
    pub async fn tracked(&self) -> usize {
        self.handles.lock().await.len()
    }

    /// Wait for every tracked invocation and return their outcomes in
    /// dispatch order.
    ///
    /// Invocations that finished before a later dispatch are no longer
    /// tracked and do not appear here.
    pub async fn drain(&self) -> Vec<WorkerOutcome> {
        let handles = std::mem::take(&mut *self.handles.lock().await);
        debug!(count = handles.len(), "Draining generation workers");

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    error!(error = %e, "Generation task failed to join");
                    WorkerOutcome::Abandoned(format!("Worker task failed: {}", e))
                })
            })
            .collect()
    }
}

#[async_trait]
impl Dispatcher for TokioDispatcher {
    async fn dispatch(&self, id: i64) {
        let worker = self.worker.clone();
        let permits = Arc::clone(&self.permits);

        let handle = tokio::spawn(
            async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return WorkerOutcome::Abandoned("Dispatcher closed".to_string()),
                };
                worker.run(id).await
            }
            .instrument(info_span!("generation", image.id = id)),
        );

        let mut handles = self.handles.lock().await;
        handles.retain(|handle| !handle.is_finished());
        handles.push(handle);
        debug!(id, tracked = handles.len(), "Scheduled generation worker");
    }
}
