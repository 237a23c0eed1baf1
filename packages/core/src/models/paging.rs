//! Paging metadata reported alongside a page of results.

use serde::Serialize;

use super::DataRequestParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingMetadata {
    pub current_page: i64,
    pub total_pages: i64,
    pub page_size: i64,
    pub total_item_count: i64,
}

impl PagingMetadata {
    /// Build metadata for a page; 101 items at page size 10 gives 11 pages.
    pub fn new(total_item_count: i64, current_page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_item_count + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            current_page,
            total_pages,
            page_size,
            total_item_count,
        }
    }

    pub fn for_request(total_item_count: i64, params: &DataRequestParams) -> Self {
        Self::new(total_item_count, params.page_number, params.page_size())
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}
