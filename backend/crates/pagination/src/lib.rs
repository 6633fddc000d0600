//! Page-number pagination shared by the listing endpoints.
//!
//! Clients send one-based `page` and `limit` query parameters. A
//! [`PagePolicy`] applies the endpoint's defaults and upper bound to produce a
//! validated [`PageRequest`], which repositories translate into an offset and
//! limit. Responses carry a [`PaginationMeta`] block describing the page
//! served and the total number of pages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while resolving raw pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers are one-based.
    #[error("page must be a positive integer")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("limit must be a positive integer")]
    ZeroLimit,
    /// The requested limit exceeds the endpoint maximum.
    #[error("limit must not exceed {max}")]
    LimitTooLarge {
        /// Largest accepted limit.
        max: u64,
    },
}

/// Defaults and bounds for one listing endpoint.
///
/// # Examples
/// ```
/// use pagination::PagePolicy;
///
/// let policy = PagePolicy::new(12, 100);
/// let request = policy.resolve(None, None).expect("defaults are valid");
/// assert_eq!(request.page(), 1);
/// assert_eq!(request.limit(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePolicy {
    default_limit: u64,
    max_limit: u64,
}

impl PagePolicy {
    /// Build a policy from a default and maximum page size.
    #[must_use]
    pub const fn new(default_limit: u64, max_limit: u64) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// Page size used when the client omits `limit`.
    #[must_use]
    pub const fn default_limit(&self) -> u64 {
        self.default_limit
    }

    /// Resolve optional client parameters into a validated request.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `page` or `limit` is zero, or when
    /// `limit` exceeds the policy maximum.
    pub const fn resolve(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<PageRequest, PageRequestError> {
        let page = match page {
            Some(0) => return Err(PageRequestError::ZeroPage),
            Some(value) => value,
            None => 1,
        };
        let limit = match limit {
            Some(0) => return Err(PageRequestError::ZeroLimit),
            Some(value) if value > self.max_limit => {
                return Err(PageRequestError::LimitTooLarge {
                    max: self.max_limit,
                });
            }
            Some(value) => value,
            None => self.default_limit,
        };
        Ok(PageRequest { page, limit })
    }
}

/// Validated one-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of items to skip before this page starts.
    ///
    /// # Examples
    /// ```
    /// use pagination::PagePolicy;
    ///
    /// let request = PagePolicy::new(10, 50).resolve(Some(3), Some(10)).expect("valid");
    /// assert_eq!(request.offset(), 20);
    /// ```
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Pagination block returned beside a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// One-based page number served.
    pub page: u64,
    /// Page size used for the query.
    pub limit: u64,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Total number of pages, zero when nothing matched.
    pub pages: u64,
}

impl PaginationMeta {
    /// Describe `request` against a total match count.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PagePolicy, PaginationMeta};
    ///
    /// let request = PagePolicy::new(12, 100).resolve(Some(2), None).expect("valid");
    /// let meta = PaginationMeta::new(request, 25);
    /// assert_eq!(meta.pages, 3);
    /// ```
    #[must_use]
    pub const fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit),
        }
    }
}

/// One page of items plus its pagination block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items on the current page.
    pub items: Vec<T>,
    /// Position of the page within the full result set.
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    /// Pair a page of items with the metadata for `request`.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            pagination: PaginationMeta::new(request, total),
        }
    }

    /// Transform each item while keeping the pagination block.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
