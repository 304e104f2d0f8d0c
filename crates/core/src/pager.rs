//! Pager state machine and the page window it selects.
//!
//! The pager never holds an out-of-range page: every transition clamps to
//! `1..=page_count()`, and a pager over zero items still sits on page 1.

/// Emitted when a transition actually moved the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChanged {
    pub from: u32,
    pub to: u32,
}

/// Current page, page size and total item count for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    page_size: u32,
    total_items: u64,
}

impl Pager {
    /// A pager on page 1 over zero items. A zero `page_size` is treated as 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_items: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Number of pages, never less than 1.
    pub fn page_count(&self) -> u32 {
        let pages = self.total_items.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Record offset of the first row on the current page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }

    /// Move to page `n`, clamped into range.
    pub fn set_page(&mut self, n: u32) -> Option<PageChanged> {
        let target = n.clamp(1, self.page_count());
        if target == self.page {
            return None;
        }
        let change = PageChanged {
            from: self.page,
            to: target,
        };
        self.page = target;
        Some(change)
    }

    /// Replace the total item count, re-clamping the current page.
    pub fn set_total_items(&mut self, n: u64) -> Option<PageChanged> {
        self.total_items = n;
        self.set_page(self.page)
    }

    /// Replace the page size, re-clamping the current page.
    pub fn set_page_size(&mut self, n: u32) -> Option<PageChanged> {
        self.page_size = n.max(1);
        self.set_page(self.page)
    }
}

/// The rows visible on 1-based `page` of `page_size` rows.
///
/// Exactly `records[(page-1)*size .. (page-1)*size + size]`, truncated at
/// the end of `records`. Page 0 is read as page 1.
pub fn window<T>(records: &[T], page: u32, page_size: u32) -> &[T] {
    let size = page_size as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(size);
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(records.len());
    &records[start..end]
}
