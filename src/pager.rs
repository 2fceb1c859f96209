//! Fixed-list ID pager
//!
//! A stateful cursor over an immutable sequence of IDs, producing
//! bounded-size pages on demand. Used to chunk large ID lists before
//! batched upstream detail lookups, and by the query layer to page
//! event lists.
//!
//! The page index is defined as the number of pages already consumed:
//! after one `next()` call the index is 1, the page just served is 0,
//! and the previous page index is therefore `index - 2`.

use crate::error::{AppError, Result};

/// Pages through a fixed list of IDs
#[derive(Debug, Clone)]
pub struct IdPager {
    list: Vec<i64>,
    page_size: usize,
    page: usize,
}

impl IdPager {
    /// Configure a new pager.
    ///
    /// # Arguments
    /// * `list` - IDs to page over (pass an empty list when there is none)
    /// * `page_size` - maximum items per page, must be positive
    /// * `page` - 0-based starting page index
    ///
    /// # Errors
    /// Returns `AppError::Config` when `page_size` is zero.
    pub fn new(list: Vec<i64>, page_size: usize, page: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(AppError::Config(
                "page size must be a positive number".to_string(),
            ));
        }
        Ok(Self {
            list,
            page_size,
            page,
        })
    }

    /// The configured page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages consumed so far.
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Index of the next page to be served.
    pub fn next_page(&self) -> usize {
        self.page
    }

    /// Index of the page before the one just served.
    pub fn prev_page(&self) -> usize {
        self.page.saturating_sub(2)
    }

    /// Rewind the cursor back to the first page.
    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Whether the next page's start offset is still within bounds.
    pub fn has_next(&self) -> bool {
        self.page * self.page_size < self.list.len()
    }

    /// Whether there is a page before the one just served.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Return the next page from the list, or `None` once exhausted.
    ///
    /// When the cursor starts at page 0 and the page size covers the
    /// whole list, the first call returns the entire list as one page
    /// (even when the list is empty) and the second call returns `None`.
    pub fn next(&mut self) -> Option<&[i64]> {
        let start = self.page * self.page_size;
        let stop = start + self.page_size;
        self.page += 1;

        if self.page == 1 && self.page_size >= self.list.len() {
            // one pager
            return Some(&self.list);
        }

        if start >= self.list.len() {
            return None;
        }

        Some(&self.list[start..stop.min(self.list.len())])
    }
}
