//! Image request store backends for Dripcam.
//!
//! Two [`ImageRepository`](dripcam_interface::ImageRepository) implementations:
//! - [`InMemoryImageRepository`] for tests and single-process runs
//! - [`PostgresImageRepository`] backed by diesel and an r2d2 pool

mod connection;
mod in_memory;
mod models;
mod postgres;
/// Diesel table definitions.
pub mod schema;

pub use connection::{PgPool, create_pool, run_migrations};
pub use in_memory::InMemoryImageRepository;
pub use models::{ImageRequestRow, NewImageRequestRow};
pub use postgres::PostgresImageRepository;
