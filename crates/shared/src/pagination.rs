//! Page-number pagination utilities.

use thiserror::Error;

/// Page used when the client does not ask for one.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Error type for page parameter parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("{0} must be a positive integer")]
    InvalidParameter(&'static str),
}

/// A validated page request (1-based page number plus page size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Creates a page request, rejecting non-positive values.
    pub fn new(page: i64, per_page: i64) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidParameter("page"));
        }
        if per_page < 1 {
            return Err(PaginationError::InvalidParameter("per_page"));
        }
        Ok(Self { page, per_page })
    }

    /// Parses raw query-string values.
    ///
    /// Absent or empty values fall back to the defaults. Anything else must
    /// parse as a positive integer.
    pub fn parse(page: Option<&str>, per_page: Option<&str>) -> Result<Self, PaginationError> {
        let page = parse_param("page", page, DEFAULT_PAGE)?;
        let per_page = parse_param("per_page", per_page, DEFAULT_PER_PAGE)?;
        Self::new(page, per_page)
    }

    /// Number of rows to skip for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Maximum number of rows on this page.
    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

fn parse_param(
    name: &'static str,
    raw: Option<&str>,
    default: i64,
) -> Result<i64, PaginationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| PaginationError::InvalidParameter(name)),
    }
}

/// Number of pages needed to show `total` items, `per_page` at a time.
///
/// Zero items means zero pages.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 0;
    }
    total / per_page + i64::from(total % per_page != 0)
}
