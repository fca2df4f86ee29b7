//! Page arithmetic for table list views
//!
//! Pages are 1-based. The last page number is always
//! `total_count / page_size + 1`, so a table holding an exact multiple of the
//! page size gets one trailing empty page. Existing bookmarks and links rely on
//! that numbering, so it is kept as is.

use serde::Serialize;

/// Pagination state for one list view request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    /// Table being listed
    pub table: String,

    /// Current page, never below 1
    pub page: u64,

    /// Rows per page
    pub page_size: u64,

    /// Total rows in the table
    pub total_count: u64,

    /// Highest page number
    pub max_page: u64,

    /// Previous page, present when `page > 1`
    pub prev: Option<u64>,

    /// First page, present when `page > 2`
    pub head: Option<u64>,

    /// Next page, present when `page < max_page`
    pub next: Option<u64>,

    /// Last page, present when `page + 1 < max_page`
    pub last: Option<u64>,
}

impl PageContext {
    /// Compute pagination for a requested page
    ///
    /// `page` is clamped to at least 1 and `page_size` to at least 1.
    pub fn new(table: impl Into<String>, page: u64, page_size: u64, total_count: u64) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let max_page = max_page(total_count, page_size);

        Self {
            table: table.into(),
            page,
            page_size,
            total_count,
            max_page,
            prev: (page > 1).then(|| page - 1),
            head: (page > 2).then_some(1),
            next: (page < max_page).then(|| page + 1),
            last: (page.saturating_add(1) < max_page).then_some(max_page),
        }
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Rows to fetch for this page
    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Whether any navigation should be shown at all
    pub fn has_multiple_pages(&self) -> bool {
        self.max_page > 1
    }
}

/// Highest page number for a row count
pub fn max_page(total_count: u64, page_size: u64) -> u64 {
    total_count / page_size.max(1) + 1
}

/// Parse a page number from raw request input
///
/// Missing, non-numeric, zero and negative input all mean page 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .map(|page| page as u64)
        .unwrap_or(1)
}
