//! Page windows for milestone listings.

use serde::{Deserialize, Serialize};

/// Largest page a caller may ask for.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u64,
    /// Rows per page, between 1 and [`MAX_PAGE_SIZE`].
    pub page_size: u64,
}

impl PageRequest {
    /// Build a page window, clamping out-of-range input.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Rows to return.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Page number, starting at 1.
    pub page: u64,
    /// Requested rows per page.
    pub page_size: u64,
    /// Rows across all pages.
    pub total_items: u64,
    /// Number of pages; 0 when there are no rows.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
}

impl<T> PageResponse<T> {
    /// Wrap `items` fetched for `request` out of `total_items` rows.
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.page_size);
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let page = PageRequest::new(0, 500);
        assert_eq!(page, PageRequest::new(1, MAX_PAGE_SIZE));
        assert_eq!(page.offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_page_response_totals() {
        let response = PageResponse::new(vec!["a", "b", "c"], &PageRequest::new(2, 3), 7);
        assert_eq!(response.total_pages, 3);
        assert!(response.has_next);

        let empty = PageResponse::<u8>::new(Vec::new(), &PageRequest::new(1, 20), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }
}
