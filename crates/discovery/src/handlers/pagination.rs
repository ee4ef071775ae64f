//! Pagination helpers and types.

use serde::Serialize;
use utoipa::ToSchema;

/// Default pagination limit.
pub const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on a single page.
pub const MAX_LIMIT: i64 = 200;

/// Returns the default pagination limit.
pub fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Paginated response wrapper.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total_count: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total_count,
            limit,
            offset,
        }
    }
}

/// Clamp client-supplied paging to `1..=MAX_LIMIT` and a non-negative offset.
pub fn clamp_page(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_LIMIT), offset.max(0))
}
