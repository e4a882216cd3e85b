//! Fixed-size paging over the instance list, with the local→absolute index
//! translation every mutation must go through.

/// A page cursor over a list of known length. The pager never holds the
/// items; callers slice with [`Pager::page_bounds`] or map indices with
/// [`Pager::absolute_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
}

impl Pager {
    /// `page_size` of zero is clamped to one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of pages for a list of `len` items, never less than one.
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    /// Half-open `[start, end)` bounds of the current page within a list of
    /// `len` items.
    pub fn page_bounds(&self, len: usize) -> (usize, usize) {
        let start = (self.current_page * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        (start, end)
    }

    /// The items visible on the current page.
    pub fn page<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let (start, end) = self.page_bounds(items.len());
        &items[start..end]
    }

    /// Translate a row's index within the rendered page to its index in the
    /// full list. Every edit or removal goes through this before touching
    /// the backing list.
    pub fn absolute_index(&self, local_index: usize) -> usize {
        self.current_page * self.page_size + local_index
    }

    pub fn go_to_page(&mut self, page: usize, len: usize) {
        self.current_page = page.min(self.total_pages(len) - 1);
    }

    /// Pin the view to the page containing the last item. Called whenever
    /// the item count changes so a freshly added row stays visible.
    pub fn go_to_last_page(&mut self, len: usize) {
        self.current_page = self.total_pages(len) - 1;
    }

    /// Re-clamp after a removal so the cursor never points past the end.
    pub fn clamp(&mut self, len: usize) {
        self.current_page = self.current_page.min(self.total_pages(len) - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(25, 3)]
    fn test_total_pages(#[case] len: usize, #[case] expected: usize) {
        assert_eq!(Pager::new(10).total_pages(len), expected);
    }

    #[test]
    fn test_local_index_translates_to_absolute() {
        let mut pager = Pager::new(10);
        pager.go_to_page(2, 30);
        assert_eq!(pager.absolute_index(3), 23);
    }

    #[test]
    fn test_page_slices_current_window() {
        let items: Vec<usize> = (0..25).collect();
        let mut pager = Pager::new(10);
        pager.go_to_page(2, items.len());
        assert_eq!(pager.page(&items), &[20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_go_to_last_page_follows_growth() {
        let mut pager = Pager::new(10);
        pager.go_to_last_page(10);
        assert_eq!(pager.current_page(), 0);
        pager.go_to_last_page(11);
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_clamp_after_removal() {
        let mut pager = Pager::new(10);
        pager.go_to_last_page(21);
        assert_eq!(pager.current_page(), 2);
        pager.clamp(20);
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let pager = Pager::new(10);
        assert_eq!(pager.total_pages(0), 1);
        let items: Vec<usize> = Vec::new();
        assert!(pager.page(&items).is_empty());
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(Pager::new(0).page_size(), 1);
    }
}
