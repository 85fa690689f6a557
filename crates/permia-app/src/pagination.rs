// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Fixed-size pages over a filtered row count. `page_index` is kept below
/// `page_count(total)` by [`Pagination::clamp`], which the controller calls
/// after every data or filter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    page_index: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// A zero size falls back to the default.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
            page_index: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Pulls the index back onto the last page when the total shrank.
    /// Returns true when the index moved.
    pub fn clamp(&mut self, total: usize) -> bool {
        let last = self.page_count(total) - 1;
        if self.page_index > last {
            self.page_index = last;
            return true;
        }
        false
    }

    /// Row positions of the current page within the filtered sequence.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page_index * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, total: usize) -> bool {
        self.page_index + 1 < self.page_count(total)
    }

    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.page_index -= 1;
        true
    }

    pub fn next(&mut self, total: usize) -> bool {
        if !self.can_next(total) {
            return false;
        }
        self.page_index += 1;
        true
    }

    pub fn first(&mut self) -> bool {
        let moved = self.page_index != 0;
        self.page_index = 0;
        moved
    }

    pub fn last(&mut self, total: usize) -> bool {
        let last = self.page_count(total) - 1;
        let moved = self.page_index != last;
        self.page_index = last;
        moved
    }

    /// Ignores a zero size. Keeps the first visible row on screen where
    /// possible.
    pub fn set_page_size(&mut self, page_size: usize, total: usize) -> bool {
        if page_size == 0 || page_size == self.page_size {
            return false;
        }
        let first_row = self.page_index * self.page_size;
        self.page_size = page_size;
        self.page_index = first_row / page_size;
        self.clamp(total);
        true
    }
}
