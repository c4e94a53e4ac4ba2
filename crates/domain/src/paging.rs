use serde::{Deserialize, Serialize};

/// Fixed number of rows per page in the data table.
pub const PAGE_SIZE: u64 = 50;

/// Inclusive row range requested from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub offset: u64,
    pub end_inclusive: u64,
}

impl PageRange {
    pub fn limit(&self) -> u64 {
        self.end_inclusive - self.offset + 1
    }
}

/// A 1-indexed page number. Page 0 is coerced to page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageRequest(u64);

impl PageRequest {
    pub fn new(page: u64) -> Self {
        Self(page.max(1))
    }

    pub fn first() -> Self {
        Self(1)
    }

    pub fn number(&self) -> u64 {
        self.0
    }

    /// Page k covers offsets `(k-1)*50 ..= (k-1)*50 + 49`.
    pub fn range(&self) -> PageRange {
        let offset = (self.0 - 1) * PAGE_SIZE;
        PageRange {
            offset,
            end_inclusive: offset + PAGE_SIZE - 1,
        }
    }

    /// Clamp into `1..=total_pages(total)`. An empty result set has one
    /// (empty) page.
    pub fn clamp_to(&self, total: u64) -> Self {
        Self(self.0.min(total_pages(total).max(1)))
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn previous(&self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

pub fn total_pages(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE)
}

/// Rows of one page plus the pre-pagination match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPage<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

/// A page as presented to callers, with its resolved page number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(page: PageRequest, fetched: RecordPage<T>) -> Self {
        Self {
            total_pages: total_pages(fetched.total),
            total: fetched.total,
            rows: fetched.rows,
            page: page.number(),
        }
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}
