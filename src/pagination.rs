//! This module defines the common functionality for paging data.

use serde::Deserialize;

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page size to use when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// The paging parameters of a list request.
///
/// Pages are one-based; page zero is treated as page one.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// The one-based page number.
    pub page: Option<u64>,
    /// The number of rows per page.
    pub page_size: Option<u64>,
}

impl PageQuery {
    /// Resolve the query against `config` into SQL LIMIT and OFFSET values.
    pub fn limit_offset(self, config: &PaginationConfig) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size);

        // Page numbers come straight from the query string, so the offset
        // math must not overflow on adversarial values.
        (page_size, page.saturating_sub(1).saturating_mul(page_size))
    }
}
