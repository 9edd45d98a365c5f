//! Core data types for the Dripcam image generation pipeline.
//!
//! This crate defines the image request record, its status state machine and
//! the update, filter and snapshot types shared by every other crate.

mod event;
mod filter;
mod image;
mod observability;
mod page;
mod settings;
mod status;
mod update;

pub use event::{ChangeKind, ImageEvent, ImageSnapshot};
pub use filter::ImageFilter;
pub use image::{ImageRequest, ImageRequestBuilder, ImageRequestBuilderError};
pub use observability::{Observability, init_observability};
pub use page::Page;
pub use settings::{
    DatabaseSettings, GenerationSettings, MediaSettings, MetricsExporter, ObservabilitySettings,
    ProviderSettings, ReconcilerSettings, Settings, WorkerSettings, DEFAULT_PROMPT,
};
pub use status::ImageStatus;
pub use update::{ORPHANED_JOB_MESSAGE, StatusUpdate};
