//! Record query filters.

use crate::{ImageRequest, ImageStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Filter for querying image requests.
///
/// Results are ordered newest first (`created_at` descending, then id
/// descending).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFilter {
    /// Only these statuses (empty means any)
    pub statuses: Vec<ImageStatus>,
    /// Only records created strictly before this instant
    pub created_before: Option<DateTime<Utc>>,
    /// Only records without a generated image
    pub result_path_missing: bool,
    /// Number of matching records to skip
    pub offset: Option<usize>,
    /// Maximum number of records to return
    pub limit: Option<usize>,
}

impl ImageFilter {
    /// Create a filter matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a set of statuses.
    pub fn with_statuses(mut self, statuses: &[ImageStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    /// Restrict to records created before `instant`.
    pub fn created_before(mut self, instant: DateTime<Utc>) -> Self {
        self.created_before = Some(instant);
        self
    }

    /// Restrict to records older than `age` relative to `now`.
    pub fn older_than(self, age: Duration, now: DateTime<Utc>) -> Self {
        self.created_before(now - age)
    }

    /// Restrict to records whose result image path is null.
    pub fn without_result(mut self) -> Self {
        self.result_path_missing = true;
        self
    }

    /// Skip the first `offset` matches.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Return at most `limit` matches.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a record passes the predicate part of the filter.
    ///
    /// Offset and limit are applied by the store after ordering.
    pub fn matches(&self, image: &ImageRequest) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(image.status()) {
            return false;
        }

        if let Some(before) = self.created_before
            && *image.created_at() >= before
        {
            return false;
        }

        if self.result_path_missing && image.result_image_path().is_some() {
            return false;
        }

        true
    }
}
