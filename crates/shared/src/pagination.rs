//! Page/limit pagination utilities.

use serde::Serialize;
use thiserror::Error;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Hard upper bound on any page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Error type for page parameters that cannot be satisfied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Page number must be at least 1")]
    InvalidPage,
}

/// Normalized page request.
///
/// Pages are 1-based. The limit is always within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Builds a page request, clamping the limit and rejecting page 0.
    ///
    /// A missing page defaults to 1, a missing limit to `default_limit`.
    pub fn new(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Result<Self, PageError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(PageError::InvalidPage);
        }
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Limit plus one, used to detect a following page.
    pub fn lookahead_limit(&self) -> i64 {
        i64::from(self.limit) + 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination metadata returned alongside list responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl PageInfo {
    /// Trims an over-fetched result set to the page size and reports whether more rows exist.
    pub fn split<T>(request: &PageRequest, mut rows: Vec<T>) -> (Vec<T>, Self) {
        let limit = request.limit() as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        (
            rows,
            Self {
                page: request.page(),
                limit: request.limit(),
                has_more,
            },
        )
    }
}
