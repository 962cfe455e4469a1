use serde::Serialize;

use super::Sort;
use crate::constants::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_PAGE_LIMIT};
use crate::error::QueryError;

/// Page request: 1-based page number, page size and ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
    sort: Sort,
}

impl PageRequest {
    /// Validate and create a page request
    pub fn new(page: u32, limit: u32) -> Result<Self, QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidPageRequest(
                "page must be at least 1".to_string(),
            ));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(QueryError::InvalidPageRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(Self {
            page,
            limit,
            sort: Sort::unsorted(),
        })
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: Sort::unsorted(),
        }
    }
}

/// One page of results with totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total: u64) -> Self {
        let limit = request.limit() as u64;
        Self {
            content,
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total.div_ceil(limit),
        }
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Total row count for a fetched page, or `None` when a COUNT query is needed
///
/// A short page already tells the total without asking the database.
pub(crate) fn known_total(request: &PageRequest, fetched: usize) -> Option<u64> {
    let fetched = fetched as u64;
    let limit = request.limit() as u64;
    if request.offset() == 0 {
        if fetched < limit {
            return Some(fetched);
        }
    } else if fetched != 0 && fetched < limit {
        return Some(request.offset() + fetched);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_validation() {
        assert!(PageRequest::new(1, 1).is_ok());
        assert!(PageRequest::new(1, MAX_PAGE_LIMIT).is_ok());
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(QueryError::InvalidPageRequest(_))
        ));
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_LIMIT + 1).is_err());
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 20).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(3, 20).unwrap().offset(), 40);
        assert_eq!(PageRequest::default().limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_page_totals() {
        let request = PageRequest::new(2, 10).unwrap();
        let page = Page::new(vec![1; 10], &request, 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = Page::new(vec![1; 5], &PageRequest::new(3, 10).unwrap(), 25);
        assert!(!last.has_next());

        let empty: Page<i32> = Page::new(vec![], &PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.is_empty());
        assert!(!empty.has_next());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2], &PageRequest::default(), 2).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_known_total() {
        let first = PageRequest::new(1, 10).unwrap();
        assert_eq!(known_total(&first, 4), Some(4));
        assert_eq!(known_total(&first, 10), None);

        let third = PageRequest::new(3, 10).unwrap();
        assert_eq!(known_total(&third, 4), Some(24));
        assert_eq!(known_total(&third, 0), None);
        assert_eq!(known_total(&third, 10), None);
    }
}
