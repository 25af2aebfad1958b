//! Page requests and paginated results.
//!
//! Every listing uses the same convention: `page` is a zero-based page index
//! and the row offset is `page * limit`.

use serde::{Deserialize, Serialize};

/// A zero-based page index and a page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// First page of `limit` rows.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self { page: 0, limit }
    }

    /// Row offset of this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.page as u64 * self.limit as u64
    }

    /// Cap the page size at `max_limit`, and raise a zero limit to 1.
    #[must_use]
    pub fn clamped(self, max_limit: u32) -> Self {
        Self {
            page: self.page,
            limit: self.limit.clamp(1, max_limit.max(1)),
        }
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paginated<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    /// Whether rows exist beyond this page.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        PageRequest::new(self.page, self.limit).offset() + (self.items.len() as u64) < self.total
    }
}
