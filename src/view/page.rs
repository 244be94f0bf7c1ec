//! Page of results and pagination controls

use serde::Serialize;
use std::collections::BTreeMap;

/// Pages always shown at each end of the strip, and around the current page.
const EDGE_PAGES: usize = 2;
const PAGES_BEFORE_CURRENT: usize = 2;
const PAGES_AFTER_CURRENT: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// Page links for the pagination bar; `None` marks an elided run.
    pub pages: Vec<Option<usize>>,
    /// Reductions over the searched and filtered set, ignoring pagination.
    pub stats: BTreeMap<String, usize>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            pages: self.pages,
            stats: self.stats,
        }
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// Resets a page number that no longer exists to the first page.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    if requested < 1 || requested > total_pages { 1 } else { requested }
}

pub(crate) fn page_strip(total_pages: usize, current: usize) -> Vec<Option<usize>> {
    if total_pages == 0 { return vec![]; }
    let current = current.min(total_pages);

    let mut strip = Vec::new();
    let head_end = (EDGE_PAGES + 1).min(total_pages + 1);
    strip.extend((1..head_end).map(Some));

    let mid_start = head_end.max(current.saturating_sub(PAGES_BEFORE_CURRENT));
    let mid_end = current.saturating_add(PAGES_AFTER_CURRENT + 1).min(total_pages + 1);
    if mid_start > head_end { strip.push(None); }
    strip.extend((mid_start..mid_end).map(Some));

    let tail_start = mid_end.max(total_pages.saturating_sub(EDGE_PAGES) + 1);
    if tail_start > mid_end { strip.push(None); }
    strip.extend((tail_start..=total_pages).map(Some));

    strip
}
