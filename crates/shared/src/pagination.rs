//! Offset-based pagination utilities.

use serde::Deserialize;
use thiserror::Error;

/// Default page size when the caller does not supply one.
pub const DEFAULT_LIMIT: i64 = 100;

/// Upper bound on the page size.
pub const MAX_LIMIT: i64 = 500;

/// Error type for pagination parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("skip must not be negative")]
    NegativeSkip,
    #[error("limit must be positive")]
    NonPositiveLimit,
}

/// Raw `skip`/`limit` query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OffsetQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for OffsetQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Validated offset and limit, ready to bind into `OFFSET`/`LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl OffsetQuery {
    /// Validates the query and clamps the limit to [`MAX_LIMIT`].
    pub fn page(self) -> Result<Page, PaginationError> {
        if self.skip < 0 {
            return Err(PaginationError::NegativeSkip);
        }
        if self.limit <= 0 {
            return Err(PaginationError::NonPositiveLimit);
        }
        Ok(Page {
            offset: self.skip,
            limit: self.limit.min(MAX_LIMIT),
        })
    }
}
