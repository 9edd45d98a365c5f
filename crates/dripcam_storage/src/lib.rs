//! Media file storage for Dripcam captures and generated images.

mod filesystem;

pub use filesystem::FileMediaStore;
