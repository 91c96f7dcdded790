/// Pagination disciplines shared by all list operations
///
/// Count-based: `page`/`page_size` in, full total out. Used where the whole
/// result set is materialized anyway (rankings).
///
/// Cursor-based: last-seen key in, `has_more` out. Pages are fetched with one
/// extra row; its presence is the `has_more` signal.
use serde::Serialize;

/// A validated count-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Normalize raw client input.
    ///
    /// `page` below 1 becomes 1. `page_size` that is missing, below 1 or above
    /// `max_page_size` becomes `max_page_size`.
    pub fn new(page: Option<i64>, page_size: Option<i64>, max_page_size: usize) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p as usize,
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if s >= 1 && (s as u64) <= max_page_size as u64 => s as usize,
            _ => max_page_size,
        };
        Self { page, page_size }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Take this page out of a fully sorted sequence
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let start = self.offset();
        if start >= items.len() {
            return Vec::new();
        }
        items.into_iter().skip(start).take(self.page_size).collect()
    }
}

/// Count-based result: one page plus the size of the full sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn info(&self) -> PageInfo {
        PageInfo::new(&self.request, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_records: usize,
}

impl PageInfo {
    pub fn new(request: &PageRequest, total: usize) -> Self {
        Self {
            current_page: request.page,
            page_size: request.page_size,
            total_pages: total_pages(total, request.page_size),
            total_records: total,
        }
    }
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

/// Cursor-based result
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPage<T, C> {
    pub items: Vec<T>,
    /// Effective page size after clamping
    pub page_size: usize,
    pub has_more: bool,
    /// Key to pass back to get the immediately following records
    pub next_cursor: Option<C>,
}

impl<T, C: ToString> CursorPage<T, C> {
    pub fn info(&self) -> CursorInfo {
        CursorInfo {
            page_size: self.page_size,
            has_more: self.has_more,
            next_cursor: self.next_cursor.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorInfo {
    pub page_size: usize,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Normalize a cursor page size: missing or below 1 gives the default,
/// above the maximum gives the maximum.
pub fn cursor_page_size(requested: Option<i64>, default: usize, max: usize) -> usize {
    match requested {
        Some(s) if s >= 1 => (s as u64).min(max as u64) as usize,
        _ => default.min(max),
    }
}

/// Split an over-fetched batch of `page_size + 1` rows.
///
/// Returns the first `page_size` rows and whether the extra row existed.
pub fn split_overfetch<T>(mut rows: Vec<T>, page_size: usize) -> (Vec<T>, bool) {
    let has_more = rows.len() > page_size;
    rows.truncate(page_size);
    (rows, has_more)
}
