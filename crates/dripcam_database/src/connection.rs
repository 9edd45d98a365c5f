//! Database connection utilities.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use dripcam_error::{StorageError, StorageErrorKind};
use tracing::instrument;

/// Pooled PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Create a connection pool for the PostgreSQL database at `database_url`.
///
/// # Errors
///
/// Returns a `Connection` error if `max_size` is zero or the pool cannot be
/// built (for example the server is unreachable).
#[instrument(name = "database.create_pool", skip(database_url))]
pub fn create_pool(database_url: &str, max_size: u32) -> Result<PgPool, StorageError> {
    if max_size == 0 {
        return Err(StorageError::new(StorageErrorKind::Connection(
            "Connection pool size must be at least 1".to_string(),
        )));
    }
    tracing::debug!(max_size, "Creating PostgreSQL connection pool");
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder().max_size(max_size).build(manager).map_err(|e| {
        tracing::error!(error = %e, "Failed to create connection pool");
        StorageError::new(StorageErrorKind::Connection(e.to_string()))
    })
}

/// Apply any pending embedded migrations.
#[instrument(name = "database.run_migrations", skip(pool))]
pub fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    let mut conn = pool
        .get()
        .map_err(|e| StorageError::new(StorageErrorKind::Connection(e.to_string())))?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StorageError::new(StorageErrorKind::Migration(e.to_string())))?;

    tracing::info!(count = applied.len(), "Applied database migrations");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_pool_size_is_rejected() {
        let err = create_pool("postgres://localhost/dripcam", 0).unwrap_err();
        assert!(matches!(err.kind, StorageErrorKind::Connection(ref msg) if msg.contains("at least 1")));
    }
}
