//! Page arithmetic for list views.

use crate::constants::{MAX_PAGE_BUTTONS, PAGE_SIZE};
use std::ops::{Range, RangeInclusive};

/// Number of pages needed for `total_items`; never less than one.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_items.div_ceil(page_size).max(1)
}

/// Pager over a filtered view of `total_items` rows.
///
/// The current page always satisfies `1 <= page <= total_pages()`; every
/// mutator clamps into that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    total_items: usize,
    page_size: usize,
}

impl Paginator {
    /// Pager with the standard [`PAGE_SIZE`], positioned at `page`.
    pub fn new(total_items: usize, page: usize) -> Self {
        Self::with_page_size(total_items, PAGE_SIZE, page)
    }

    pub fn with_page_size(total_items: usize, page_size: usize, page: usize) -> Self {
        let mut pager = Self {
            page,
            total_items,
            page_size: page_size.max(1),
        };
        pager.page = pager.clamp(page);
        pager
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages())
    }

    /// Update the row count after a refetch or filter change, keeping the
    /// current page in range.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.page = self.clamp(self.page);
    }

    pub fn first(&mut self) {
        self.page = 1;
    }

    pub fn last(&mut self) {
        self.page = self.total_pages();
    }

    pub fn next(&mut self) {
        self.page = (self.page + 1).min(self.total_pages());
    }

    pub fn previous(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Jump straight to `page` (as from a numbered button).
    pub fn jump_to(&mut self, page: usize) {
        self.page = self.clamp(page);
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Index range of the current page, clipped to the row count.
    pub fn range(&self) -> Range<usize> {
        let start = (self.page - 1)
            .saturating_mul(self.page_size)
            .min(self.total_items);
        let end = start.saturating_add(self.page_size).min(self.total_items);
        start..end
    }

    /// Slice the current page out of the filtered view.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    /// Numbered buttons to show: at most [`MAX_PAGE_BUTTONS`], sliding so the
    /// current page stays centred once away from either end.
    pub fn visible_pages(&self) -> RangeInclusive<usize> {
        let total = self.total_pages();
        let span = MAX_PAGE_BUTTONS;
        let half = span / 2;
        if total <= span {
            1..=total
        } else if self.page <= half + 1 {
            1..=span
        } else if self.page >= total - half {
            (total - span + 1)..=total
        } else {
            (self.page - half)..=(self.page + half)
        }
    }

    /// `"Showing {first+1} to {min(last, N)} of {N} items."`
    pub fn summary(&self) -> String {
        let first = (self.page - 1) * self.page_size;
        let last = self.page * self.page_size;
        format!(
            "Showing {} to {} of {} items.",
            first + 1,
            last.min(self.total_items),
            self.total_items
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buttons(total_items: usize, page: usize) -> Vec<usize> {
        Paginator::new(total_items, page).visible_pages().collect()
    }

    #[test]
    fn total_pages_is_never_zero() {
        assert_eq!(total_pages(0, PAGE_SIZE), 1);
        assert_eq!(total_pages(1, PAGE_SIZE), 1);
        assert_eq!(total_pages(10, PAGE_SIZE), 1);
        assert_eq!(total_pages(11, PAGE_SIZE), 2);
        assert_eq!(total_pages(120, PAGE_SIZE), 12);
    }

    #[test]
    fn empty_view_has_one_empty_page() {
        let pager = Paginator::new(0, 1);
        let items: Vec<u32> = Vec::new();
        assert_eq!(pager.total_pages(), 1);
        assert!(pager.window(&items).is_empty());
        assert_eq!(pager.summary(), "Showing 1 to 0 of 0 items.");
    }

    #[test]
    fn sliding_button_window_matches_expected_sets() {
        assert_eq!(buttons(120, 10), vec![8, 9, 10, 11, 12]);
        assert_eq!(buttons(120, 1), vec![1, 2, 3, 4, 5]);
        assert_eq!(buttons(120, 6), vec![4, 5, 6, 7, 8]);
        assert_eq!(buttons(120, 3), vec![1, 2, 3, 4, 5]);
        assert_eq!(buttons(120, 4), vec![2, 3, 4, 5, 6]);
        assert_eq!(buttons(120, 9), vec![7, 8, 9, 10, 11]);
        assert_eq!(buttons(120, 12), vec![8, 9, 10, 11, 12]);
        assert_eq!(buttons(35, 2), vec![1, 2, 3, 4]);
        assert_eq!(buttons(0, 1), vec![1]);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut pager = Paginator::new(25, 1);
        pager.previous();
        assert_eq!(pager.page(), 1);
        pager.next();
        pager.next();
        pager.next();
        assert_eq!(pager.page(), 3);
        assert!(!pager.has_next());
        pager.first();
        assert_eq!(pager.page(), 1);
        pager.last();
        assert_eq!(pager.page(), 3);
        pager.jump_to(2);
        assert_eq!(pager.page(), 2);
        pager.jump_to(99);
        assert_eq!(pager.page(), 3);
        pager.jump_to(0);
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn shrinking_total_clamps_current_page() {
        let mut pager = Paginator::new(95, 10);
        assert_eq!(pager.page(), 10);
        pager.set_total_items(12);
        assert_eq!(pager.page(), 2);
        pager.set_total_items(0);
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn pages_partition_the_view_in_order() {
        let items: Vec<usize> = (0..47).collect();
        let mut pager = Paginator::new(items.len(), 1);
        let mut seen = Vec::new();
        for page in 1..=pager.total_pages() {
            pager.jump_to(page);
            let window = pager.window(&items);
            assert!(window.len() <= PAGE_SIZE);
            seen.extend_from_slice(window);
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn summary_caps_last_index_at_total() {
        assert_eq!(
            Paginator::new(47, 5).summary(),
            "Showing 41 to 47 of 47 items."
        );
        assert_eq!(
            Paginator::new(47, 2).summary(),
            "Showing 11 to 20 of 47 items."
        );
    }
}
