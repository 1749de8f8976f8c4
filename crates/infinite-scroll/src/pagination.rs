//! Pagination Module
//!
//! Pure functions for slicing an ordered dataset into 1-based pages.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

// ============================================================================
// Page Types
// ============================================================================

/// Metadata describing where a page sits within the full dataset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// 1-based number of this page
    pub current_page: usize,
    /// Page to request next, `None` once the dataset is exhausted
    pub next_page: Option<usize>,
    pub prev_page: Option<usize>,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl PageMeta {
    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}

/// A bounded slice of the dataset plus its metadata
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

// ============================================================================
// Core Formulas
// ============================================================================

/// Number of pages needed to hold `total_items` (zero for an empty dataset)
pub fn total_pages(total_items: usize, page_size: NonZeroUsize) -> usize {
    total_items.div_ceil(page_size.get())
}

/// Index range of `page` within a dataset of `total_items`
///
/// Pages past the end yield an empty range anchored at `total_items`.
pub fn page_bounds(page: usize, page_size: NonZeroUsize, total_items: usize) -> std::ops::Range<usize> {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size.get()).min(total_items);
    let end = start.saturating_add(page_size.get()).min(total_items);
    start..end
}

/// Slice `data` into the requested page
///
/// Page numbers are 1-based; page 0 is treated as page 1.
pub fn paginate<T: Clone>(data: &[T], page: usize, page_size: NonZeroUsize) -> Page<T> {
    let page = page.max(1);
    let total_items = data.len();
    let total_pages = total_pages(total_items, page_size);
    let bounds = page_bounds(page, page_size, total_items);

    Page {
        items: data[bounds].to_vec(),
        meta: PageMeta {
            current_page: page,
            next_page: (page < total_pages).then(|| page + 1),
            prev_page: (page > 1).then(|| (page - 1).min(total_pages.max(1))),
            total_pages,
            total_items,
            page_size: page_size.get(),
        },
    }
}
