//! Diesel models for the `image_requests` table.

use crate::schema::image_requests;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use dripcam_core::{ImageRequest, ImageStatus};
use dripcam_error::{StorageError, StorageErrorKind};
use std::str::FromStr;

/// Database row for the image_requests table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, derive_getters::Getters)]
#[diesel(table_name = image_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ImageRequestRow {
    id: i64,
    status: String,
    source_image_path: String,
    result_image_path: Option<String>,
    prompt: Option<String>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    attempt: i32,
}

impl TryFrom<ImageRequestRow> for ImageRequest {
    type Error = StorageError;

    fn try_from(row: ImageRequestRow) -> Result<Self, Self::Error> {
        let status = ImageStatus::from_str(&row.status).map_err(|_| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "Unknown status '{}' on image request {}",
                row.status, row.id
            )))
        })?;
        let attempt = u32::try_from(row.attempt).map_err(|_| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "Negative attempt counter on image request {}",
                row.id
            )))
        })?;

        ImageRequest::builder()
            .id(row.id)
            .status(status)
            .source_image_path(row.source_image_path)
            .result_image_path(row.result_image_path)
            .prompt(row.prompt)
            .error_message(row.error_message)
            .created_at(row.created_at)
            .updated_at(row.updated_at)
            .attempt(attempt)
            .build()
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))
    }
}

/// Insertable struct for a new pending request.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = image_requests)]
pub struct NewImageRequestRow {
    pub status: String,
    pub source_image_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written by a status transition.
///
/// Every mutable column is written, so `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = image_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct StatusChangeset {
    pub status: String,
    pub result_image_path: Option<String>,
    pub prompt: Option<String>,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub attempt: i32,
}

impl TryFrom<&ImageRequest> for StatusChangeset {
    type Error = StorageError;

    fn try_from(image: &ImageRequest) -> Result<Self, Self::Error> {
        let attempt = i32::try_from(*image.attempt()).map_err(|_| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "Attempt counter overflow on image request {}",
                image.id()
            )))
        })?;

        Ok(Self {
            status: image.status().to_string(),
            result_image_path: image.result_image_path().clone(),
            prompt: image.prompt().clone(),
            error_message: image.error_message().clone(),
            updated_at: *image.updated_at(),
            attempt,
        })
    }
}
