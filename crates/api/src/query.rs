//! Shared query parameter types for API handlers.

use clientdesk_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)` ready for the store.
    pub fn resolve(&self) -> (i64, i64) {
        (
            clamp_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT),
            clamp_offset(self.offset),
        )
    }
}

/// List filter for status-bearing resources (`?status=&limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct StatusListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl StatusListParams {
    pub fn page(&self) -> (i64, i64) {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
        .resolve()
    }

    /// The status filter, with blank treated as absent.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
