//! Trait definitions for the Dripcam image generation pipeline.
//!
//! The pipeline talks to its record store, media storage and image provider
//! only through these traits, so each can be swapped for a test double.

mod generator;
mod media;
mod repository;

pub use generator::ImageGenerator;
pub use media::{MediaKind, MediaStore};
pub use repository::ImageRepository;
