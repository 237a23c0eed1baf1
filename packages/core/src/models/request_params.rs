//! Collection request parameters shared by every paged query.

/// Largest page a caller may request; bigger values are clamped to this.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Page size used when the caller does not supply one
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Page number, page size and optional name search for collection queries.
///
/// `page_size` is clamped on assignment: anything above [`MAX_PAGE_SIZE`] is
/// replaced by the maximum rather than rejected. `page_number` is taken as
/// given.
///
/// ```rust
/// # use unionall_core::models::DataRequestParams;
/// let params = DataRequestParams::new(3, 5000, None);
/// assert_eq!(params.page_size(), 1000);
/// assert_eq!(params.skip(), 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRequestParams {
    pub page_number: i64,
    page_size: i64,
    pub search_query: Option<String>,
}

impl Default for DataRequestParams {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search_query: None,
        }
    }
}

impl DataRequestParams {
    pub fn new(page_number: i64, page_size: i64, search_query: Option<String>) -> Self {
        let mut params = Self {
            page_number,
            page_size: DEFAULT_PAGE_SIZE,
            search_query,
        };
        params.set_page_size(page_size);
        params
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: i64) {
        self.page_size = page_size.min(MAX_PAGE_SIZE);
    }

    /// Rows to skip before the requested page
    ///
    /// Saturates instead of overflowing; page numbers below 1 give a
    /// non-positive value, which the store treats as no offset.
    pub fn skip(&self) -> i64 {
        self.page_size
            .saturating_mul(self.page_number.saturating_sub(1))
    }

    /// Rows in one page
    pub fn take(&self) -> i64 {
        self.page_size
    }

    /// Trimmed, lower-cased search term; `None` when absent or blank
    pub fn search_term(&self) -> Option<String> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Parameters for the page after this one
    pub fn next_page(&self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = DataRequestParams::default();
        assert_eq!(params.page_number, 1);
        assert_eq!(params.page_size(), 100);
        assert_eq!(params.skip(), 0);
        assert!(params.search_term().is_none());
    }

    #[test]
    fn test_page_size_clamped_to_maximum() {
        let mut params = DataRequestParams::default();
        params.set_page_size(1001);
        assert_eq!(params.page_size(), 1000);
        params.set_page_size(1000);
        assert_eq!(params.page_size(), 1000);
        params.set_page_size(25);
        assert_eq!(params.page_size(), 25);
    }

    #[test]
    fn test_skip_and_take() {
        let params = DataRequestParams::new(4, 25, None);
        assert_eq!(params.skip(), 75);
        assert_eq!(params.take(), 25);
    }

    #[test]
    fn test_skip_saturates_on_extreme_page_numbers() {
        assert_eq!(DataRequestParams::new(i64::MAX, 1000, None).skip(), i64::MAX);
        assert_eq!(DataRequestParams::new(i64::MIN, 10, None).skip(), i64::MIN);
        assert_eq!(DataRequestParams::new(0, 10, None).skip(), -10);
        assert_eq!(DataRequestParams::new(-3, 10, None).skip(), -40);
    }

    #[test]
    fn test_search_term_is_trimmed_and_folded() {
        let params = DataRequestParams::new(1, 10, Some("  FrAnce ".to_string()));
        assert_eq!(params.search_term().as_deref(), Some("france"));

        let blank = DataRequestParams::new(1, 10, Some("   ".to_string()));
        assert!(blank.search_term().is_none());
    }

    #[test]
    fn test_next_page_keeps_size_and_search() {
        let params = DataRequestParams::new(1, 2, Some("fr".to_string()));
        let next = params.next_page();
        assert_eq!(next.page_number, 2);
        assert_eq!(next.page_size(), 2);
        assert_eq!(next.search_query.as_deref(), Some("fr"));
    }
}
