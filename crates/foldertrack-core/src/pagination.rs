//! Fixed-size page window over the filtered view.

use std::ops::Range;

/// Rows per page.
pub const PAGE_SIZE: usize = 10;

/// Number of pages needed for `len` rows; never less than one.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Current page (1-based) over a view of changing length.
///
/// Invariant: `1 <= current <= total_pages(len)` for the length last passed
/// to any method taking `len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    current: usize,
    page_size: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl PageWindow {
    pub fn new(page_size: usize) -> Self {
        Self {
            current: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    /// Back to the first page (used whenever the view is recomputed).
    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Pull the page back inside `[1, total_pages(len)]`.
    pub fn clamp(&mut self, len: usize) {
        self.current = self.current.clamp(1, self.total_pages(len));
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current < self.total_pages(len)
    }

    /// Advance one page. No-op (returns false) on the last page.
    pub fn next(&mut self, len: usize) -> bool {
        if self.has_next(len) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. No-op (returns false) on the first page.
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn last(&mut self, len: usize) {
        self.current = self.total_pages(len);
    }

    /// Index range of the visible rows within a view of `len` rows.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = ((self.current - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }

    pub fn slice<'a, T>(&self, view: &'a [T]) -> &'a [T] {
        &view[self.range(view.len())]
    }
}
