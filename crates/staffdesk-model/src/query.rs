//! List query state and page results.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::record::Record;

/// Default rows per page for list screens.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort direction for a list column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Query parameter form (`asc` / `desc`).
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SmolStr,
    pub direction: SortDirection,
}

/// Client-visible list state: page, page size, search term, and sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Empty means no search filter.
    pub search: String,
    /// `None` means server order.
    pub sort: Option<SortSpec>,
}

impl ListQuery {
    /// First page, no search, unsorted. A zero page size is raised to one.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            sort: None,
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Number of navigable pages for `total` rows; never less than one.
#[must_use]
pub fn page_count(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Pagination metadata as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMeta {
    pub first: u64,
    pub last: u64,
    pub current_page: u64,
    pub max_pages: u64,
    pub limit: u64,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl PageMeta {
    /// Total matching rows; falls back to `count` when `total` is absent.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total.unwrap_or(self.count)
    }
}

/// One fetched page of rows plus the total row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// Rows in server order.
    pub rows: Vec<Record>,
    pub total_count: u64,
    pub meta: PageMeta,
}

impl PageResult {
    #[must_use]
    pub fn page_count(&self, page_size: u32) -> u32 {
        page_count(self.total_count, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up_and_never_drops_below_one() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(21, 10), 3);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn meta_total_falls_back_to_count() {
        let meta: PageMeta = serde_json::from_str(
            r#"{"first":1,"last":10,"currentPage":1,"maxPages":3,"limit":10,"count":24}"#,
        )
        .expect("meta");
        assert_eq!(meta.max_pages, 3);
        assert_eq!(meta.total_count(), 24);

        let meta: PageMeta =
            serde_json::from_str(r#"{"count":10,"total":31}"#).expect("partial meta");
        assert_eq!(meta.total_count(), 31);
        assert_eq!(meta.current_page, 0);
    }

    #[test]
    fn sort_direction_toggles_both_ways() {
        assert_eq!(
            SortDirection::Ascending.toggled(),
            SortDirection::Descending
        );
        assert_eq!(
            SortDirection::Descending.toggled(),
            SortDirection::Ascending
        );
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Descending));
        assert_eq!(SortDirection::parse("sideways"), None);
    }
}
