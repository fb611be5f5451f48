//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Maximum page size for list endpoints.
pub const MAX_PAGE_SIZE: u64 = 200;

/// A page request from a caller.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    /// Zero-based page number.
    #[serde(default)]
    pub page: u64,
    /// Requested page size.
    #[serde(default = "default_page_size")]
    pub per_page: u64,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Returns the effective page size, clamped to `MAX_PAGE_SIZE`.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }

    /// Returns the row offset for this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.limit())
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Zero-based page number.
    pub page: u64,
    /// Page size used.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub total: u64,
}

impl<T> PageResponse<T> {
    /// Creates a page response.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.limit(),
            total,
        }
    }
}
