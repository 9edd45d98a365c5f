//! Paginated query results.

use serde::{Deserialize, Serialize};

/// One page of results, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total matching items across all pages
    pub total: usize,
    /// 1-based page number
    pub page: usize,
    /// Maximum items per page
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Number of the last page (at least 1).
    pub fn last_page(&self) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Whether a later page exists.
    pub fn has_more(&self) -> bool {
        self.page < self.last_page()
    }
}
