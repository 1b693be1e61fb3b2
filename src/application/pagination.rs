//! Offset pagination helpers for list endpoints.

use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A normalized page request: `page` starts at 1, `limit` is within `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> OffsetPage<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let request = PageRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 10);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let request = PageRequest::new(Some(0), Some(500));
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, MAX_PAGE_LIMIT);

        assert_eq!(PageRequest::new(None, Some(0)).limit, 1);
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
    }
}
