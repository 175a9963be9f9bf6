//! Paginated results.

use serde::{Deserialize, Serialize};

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Number of rows matching the filter, ignoring pagination.
    pub total: u64,

    /// The rows on this page.
    pub items: Vec<T>,

    /// 1-based page number.
    pub page: u32,

    /// Page size.
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(total: u64, items: Vec<T>, page: u32, per_page: u32) -> Self {
        Self {
            total,
            items,
            page,
            per_page,
        }
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of pages needed for `total` rows. At least one.
    pub fn number_of_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.per_page)).max(1)
    }

    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.number_of_pages()
    }

    /// Returns true if an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Zero-based index of the first row on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_navigation() {
        let page = Page::new(25, vec![1, 2, 3, 4, 5], 3, 10);
        assert_eq!(page.number_of_pages(), 3);
        assert!(!page.has_next());
        assert!(page.has_previous());
        assert_eq!(page.offset(), 20);

        let first = Page::new(25, vec![0; 10], 1, 10);
        assert!(first.has_next());
        assert!(!first.has_previous());
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let page: Page<i32> = Page::new(0, vec![], 1, 10);
        assert_eq!(page.number_of_pages(), 1);
        assert!(page.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(2, vec![1, 2], 1, 10).map(|i| i * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 2);
    }
}
