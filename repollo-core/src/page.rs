//! Page-number pagination over query snapshots.
//!
//! [`QueryResult`](crate::query::QueryResult) already offers raw `offset`/`limit`.
//! This module layers 1-indexed page navigation on top: a [`PaginationParams`]
//! selects a page and [`Page`] carries the items along with the total count and the
//! neighbouring page numbers.

use serde::{Deserialize, Serialize};

/// A single page of a larger result set.
///
/// # Example
///
/// ```ignore
/// use repollo_core::page::PaginationParams;
///
/// let page = PaginationParams::new(2, 10).paginate((1..=25).collect::<Vec<_>>());
///
/// assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
/// assert_eq!(page.count, 25);
/// assert_eq!(page.next_page, Some(3));
/// assert_eq!(page.previous_page, Some(1));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub count: usize,
    /// The next page number, if there are items after this page.
    pub next_page: Option<usize>,
    /// The previous page number, if this is not the first page.
    pub previous_page: Option<usize>,
}

impl<T> Page<T> {
    /// Creates a builder for a page holding `items`.
    pub fn builder(items: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(items)
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            next_page: None,
            previous_page: None,
        }
    }
}

/// Builder for [`Page`].
pub struct PageBuilder<T> {
    items: Vec<T>,
    count: usize,
    next_page: Option<usize>,
    previous_page: Option<usize>,
}

impl<T> PageBuilder<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            count: 0,
            next_page: None,
            previous_page: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_next_page(mut self, next_page: Option<usize>) -> Self {
        self.next_page = next_page;
        self
    }

    pub fn with_previous_page(mut self, previous_page: Option<usize>) -> Self {
        self.previous_page = previous_page;
        self
    }

    pub fn build(self) -> Page<T> {
        Page {
            items: self.items,
            count: self.count,
            next_page: self.next_page,
            previous_page: self.previous_page,
        }
    }
}

/// Selects one page of a result set. Pages are 1-indexed; page `0` is read as page `1`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The page number.
    pub page: usize,
    /// Number of items per page.
    pub per_page: usize,
}

impl PaginationParams {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    pub fn builder() -> PaginationParamsBuilder {
        PaginationParamsBuilder::new()
    }

    /// The page number with `0` normalized to `1`.
    pub fn page_number(&self) -> usize {
        self.page.max(1)
    }

    /// Number of items that precede this page.
    pub fn offset(&self) -> usize {
        (self.page_number() - 1).saturating_mul(self.per_page)
    }

    /// Cuts this page out of `items`.
    ///
    /// A page past the end yields no items but still reports the total count and a
    /// previous page.
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let count = items.len();
        let page = self.page_number();
        let start = self.offset().min(count);
        let end = start.saturating_add(self.per_page).min(count);

        let previous_page = (page > 1).then(|| page - 1);
        let next_page = (end < count).then(|| page + 1);

        let items = items
            .into_iter()
            .skip(start)
            .take(end - start)
            .collect();

        Page::builder(items)
            .with_count(count)
            .with_next_page(next_page)
            .with_previous_page(previous_page)
            .build()
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: 10 }
    }
}

/// Builder for [`PaginationParams`]; unset values default to page 1, 10 per page.
#[derive(Default)]
pub struct PaginationParamsBuilder {
    page: Option<usize>,
    per_page: Option<usize>,
}

impl PaginationParamsBuilder {
    pub fn new() -> Self {
        Self { page: None, per_page: None }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn build(self) -> PaginationParams {
        PaginationParams {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let page = PaginationParams::new(2, 10).paginate((1..=25).collect::<Vec<_>>());
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.count, 25);
        assert_eq!(page.next_page, Some(3));
        assert_eq!(page.previous_page, Some(1));
    }

    #[test]
    fn test_last_partial_page() {
        let page = PaginationParams::new(3, 10).paginate((1..=25).collect::<Vec<_>>());
        assert_eq!(page.items, (21..=25).collect::<Vec<_>>());
        assert_eq!(page.next_page, None);
        assert_eq!(page.previous_page, Some(2));
    }

    #[test]
    fn test_page_past_end() {
        let page = PaginationParams::new(5, 10).paginate(vec![1, 2, 3]);
        assert!(page.items.is_empty());
        assert_eq!(page.count, 3);
        assert_eq!(page.next_page, None);
        assert_eq!(page.previous_page, Some(4));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let params = PaginationParams::new(0, 2);
        assert_eq!(params.offset(), 0);

        let page = params.paginate(vec!['a', 'b', 'c']);
        assert_eq!(page.items, vec!['a', 'b']);
        assert_eq!(page.previous_page, None);
        assert_eq!(page.next_page, Some(2));
    }

    #[test]
    fn test_empty_input() {
        let page = PaginationParams::default().paginate(Vec::<u8>::new());
        assert_eq!(page, Page::default());
    }

    #[test]
    fn test_builder_defaults() {
        let params = PaginationParams::builder().with_per_page(50).build();
        assert_eq!(params, PaginationParams::new(1, 50));
    }
}
