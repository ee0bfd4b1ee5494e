//! Read and list options, and the page envelope.

use engram_core::{EntityId, Timestamp};

use crate::query::Sort;

/// Options for single-record reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Include soft-deleted records. Off by default.
    pub include_deleted: bool,
}

impl ReadOptions {
    pub fn with_deleted() -> Self {
        Self {
            include_deleted: true,
        }
    }
}

/// Options for list operations.
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Exclusive cursor: the id of the last record of the previous page.
    pub cursor: Option<EntityId>,
    pub limit: usize,
    pub sort: Sort,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub include_deleted: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: 50,
            sort: Sort::default(),
            start_date: None,
            end_date: None,
            include_deleted: false,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cursor(mut self, cursor: EntityId) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_date_range(mut self, start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}

/// One page of a cursor-paginated listing.
///
/// `total` is the count of every record matching the filter, not the page
/// size; `next_cursor` is the id of the last returned item and is only
/// present when another page exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub has_more: bool,
    pub next_cursor: Option<EntityId>,
}
