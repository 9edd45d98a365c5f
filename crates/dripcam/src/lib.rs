//! Dripcam: webcam captures in, generated images out.
//!
//! This crate re-exports the workspace crates and wires them together for
//! the `dripcam` binary.
//!
//! ```no_run
//! use dripcam::{App, Settings};
//!
//! # async fn example() -> dripcam::DripcamResult<()> {
//! let settings = Settings::load(None)?;
//! let app = App::connect(settings)?;
//! let (pipeline, dispatcher) = app.pipeline()?;
//! let id = pipeline.submit(b"...jpeg bytes...").await?;
//! dispatcher.drain().await;
//! println!("{:?}", pipeline.get(id).await?.status());
//! # Ok(())
//! # }
//! ```

mod app;
pub mod cli;

pub use app::App;
pub use dripcam_core::*;
pub use dripcam_database::{
    InMemoryImageRepository, PgPool, PostgresImageRepository, create_pool, run_migrations,
};
pub use dripcam_error::*;
pub use dripcam_interface::{ImageGenerator, ImageRepository, MediaKind, MediaStore};
pub use dripcam_models::GeminiImageClient;
pub use dripcam_pipeline::*;
pub use dripcam_storage::FileMediaStore;
