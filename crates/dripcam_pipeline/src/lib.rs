//! The Dripcam generation pipeline.
//!
//! Captures come in through [`Pipeline::submit`], which stores the bytes,
//! creates a `pending` record and hands the id to a [`Dispatcher`]. A
//! [`GenerationWorker`] claims the record, calls the image provider and
//! records the terminal state. The [`Reconciler`] force-fails records whose
//! worker never finished. Every persisted change goes through [`ImageStore`],
//! which publishes an [`ImageEvent`](dripcam_core::ImageEvent) on
//! [`ImageEvents`].

mod dispatch;
mod events;
mod metrics;
mod pipeline;
mod reconciler;
mod store;
mod worker;

pub use dispatch::{Dispatcher, TokioDispatcher};
pub use events::{DEFAULT_EVENT_CAPACITY, ImageEvents};
pub use metrics::PipelineMetrics;
pub use pipeline::{DEFAULT_PAGE_SIZE, Pipeline};
pub use reconciler::{ReconcileReport, ReconcileScope, Reconciler};
pub use store::ImageStore;
pub use worker::{GenerationWorker, WorkerOutcome};
