//! Query-string paging parameters and the `X-Pagination` response header

use axum::http::{HeaderName, HeaderValue};
use serde::Deserialize;
use unionall_core::models::{DataRequestParams, PagingMetadata, DEFAULT_PAGE_SIZE};

pub static X_PAGINATION: HeaderName = HeaderName::from_static("x-pagination");

/// `?pageNumber=&pageSize=&searchQuery=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
    pub search_query: Option<String>,
}

impl From<PageQuery> for DataRequestParams {
    fn from(query: PageQuery) -> Self {
        DataRequestParams::new(
            query.page_number.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            query.search_query,
        )
    }
}

/// Serialized paging metadata for the `X-Pagination` header
pub fn pagination_header(total: i64, params: &DataRequestParams) -> (HeaderName, HeaderValue) {
    let metadata = PagingMetadata::for_request(total, params);
    let value = serde_json::to_string(&metadata)
        .ok()
        .and_then(|json| HeaderValue::from_str(&json).ok())
        .unwrap_or_else(|| HeaderValue::from_static("{}"));
    (X_PAGINATION.clone(), value)
}
