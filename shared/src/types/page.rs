use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Zero-based page request, clamped to `1..=MAX_PAGE_SIZE` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page as i64 * self.size as i64
    }

    pub fn limit(&self) -> i64 {
        self.size as i64
    }
}

/// One page of results plus enough metadata to fetch the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub result: Vec<T>,
    pub total_pages: u32,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(result: Vec<T>, total: i64, request: PageRequest) -> Self {
        let total = total.max(0) as u64;
        let size = request.size.max(1) as u64;
        Self {
            result,
            total_pages: total.div_ceil(size) as u32,
            page: request.page,
            size: request.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_clamped() {
        assert_eq!(PageRequest::new(0, 0).size, 1);
        assert_eq!(PageRequest::new(0, 1000).size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(0, 20).size, 20);
    }

    #[test]
    fn offset_is_page_times_size() {
        assert_eq!(PageRequest::new(3, 10).offset(), 30);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<i64> = Page::new(vec![], 11, PageRequest::new(0, 10));
        assert_eq!(page.total_pages, 2);
        let page: Page<i64> = Page::new(vec![], 0, PageRequest::new(0, 10));
        assert_eq!(page.total_pages, 0);
    }
}
