//! PostgreSQL implementation of ImageRepository.

use crate::models::{ImageRequestRow, NewImageRequestRow, StatusChangeset};
use crate::schema::image_requests;
use crate::PgPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use dripcam_core::{ImageFilter, ImageRequest, ImageStatus, StatusUpdate};
use dripcam_error::{StorageError, StorageErrorKind};
use dripcam_interface::ImageRepository;
use tracing::{debug, instrument};

/// PostgreSQL-backed repository for image requests.
///
/// Diesel is synchronous, so every call runs on the blocking thread pool with
/// its own pooled connection. Conditional updates lock the row with
/// `SELECT ... FOR UPDATE` inside a transaction before checking the guard.
#[derive(Clone)]
pub struct PostgresImageRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresImageRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresImageRepository")
            .field("state", &self.pool.state())
            .finish()
    }
}

impl PostgresImageRepository {
    /// Create a repository over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    async fn run<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StorageError::new(StorageErrorKind::Connection(e.to_string())))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StorageError::new(StorageErrorKind::Connection(format!(
                "Database task failed: {}",
                e
            )))
        })?
    }
}

/// Build the boxed WHERE part of a filter.
fn filtered(filter: &ImageFilter) -> image_requests::BoxedQuery<'static, Pg> {
    let mut query = image_requests::table.into_boxed();

    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter.statuses.iter().map(ImageStatus::to_string).collect();
        query = query.filter(image_requests::status.eq_any(statuses));
    }

    if let Some(before) = filter.created_before {
        query = query.filter(image_requests::created_at.lt(before));
    }

    if filter.result_path_missing {
        query = query.filter(image_requests::result_image_path.is_null());
    }

    query
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    #[instrument(skip(self))]
    async fn create(
        &self,
        source_image_path: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ImageRequest, StorageError> {
        let new_row = NewImageRequestRow {
            status: ImageStatus::Pending.to_string(),
            source_image_path: source_image_path.to_string(),
            created_at,
            updated_at: created_at,
        };

        let row = self
            .run(move |conn| {
                diesel::insert_into(image_requests::table)
                    .values(&new_row)
                    .returning(ImageRequestRow::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)
            })
            .await?;

        debug!(id = row.id(), "Created image request");
        row.try_into()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<ImageRequest, StorageError> {
        let row = self
            .run(move |conn| {
                image_requests::table
                    .find(id)
                    .select(ImageRequestRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(StorageError::from)
            })
            .await?;

        row.ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(id)))?
            .try_into()
    }

    #[instrument(skip(self, update), fields(target = %update.status()))]
    async fn update_status(
        &self,
        id: i64,
        update: &StatusUpdate,
    ) -> Result<ImageRequest, StorageError> {
        update.validate()?;
        let update = update.clone();

        self.run(move |conn| {
            conn.transaction::<_, StorageError, _>(|conn| {
                let row = image_requests::table
                    .find(id)
                    .select(ImageRequestRow::as_select())
                    .for_update()
                    .first(conn)
                    .optional()?
                    .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(id)))?;
                let mut image = ImageRequest::try_from(row)?;

                if !update.permits(&image) {
                    debug!(id, current = %image.status(), "Update guard rejected");
                    return Err(StorageError::new(StorageErrorKind::Conflict {
                        id,
                        current: image.status().to_string(),
                    }));
                }

                image.apply(&update, Utc::now());
                let changeset = StatusChangeset::try_from(&image)?;

                let row = diesel::update(image_requests::table.find(id))
                    .set(&changeset)
                    .returning(ImageRequestRow::as_returning())
                    .get_result::<ImageRequestRow>(conn)?;
                ImageRequest::try_from(row)
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn query(&self, filter: &ImageFilter) -> Result<Vec<ImageRequest>, StorageError> {
        let filter = filter.clone();
        let rows = self
            .run(move |conn| {
                let mut query = filtered(&filter)
                    .select(ImageRequestRow::as_select())
                    .order((image_requests::created_at.desc(), image_requests::id.desc()));

                if let Some(offset) = filter.offset {
                    query = query.offset(to_i64(offset));
                }
                if let Some(limit) = filter.limit {
                    query = query.limit(to_i64(limit));
                }

                query.load::<ImageRequestRow>(conn).map_err(StorageError::from)
            })
            .await?;

        rows.into_iter().map(ImageRequest::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &ImageFilter) -> Result<usize, StorageError> {
        let filter = filter.clone();
        let total = self
            .run(move |conn| {
                filtered(&filter)
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)
            })
            .await?;

        Ok(usize::try_from(total).unwrap_or(0))
    }
}
