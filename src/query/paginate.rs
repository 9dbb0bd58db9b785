//! Page windows over a counted result set.

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

const MAX_SQL_WINDOW: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub page: u64,
    pub perpage: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageDescriptor>,
}

/// The requested window. Both values are always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub perpage: u64,
}

impl PageRequest {
    pub fn new(page: u64, perpage: u64) -> Self {
        Self { page: page.max(1), perpage: perpage.max(1) }
    }

    /// Malformed or non-positive inputs silently fall back to the defaults.
    pub fn from_params(page: Option<&str>, perpage: Option<&str>, config: &PaginationConfig) -> Self {
        let page = parse_positive(page).unwrap_or(config.default_page);
        let mut perpage = parse_positive(perpage).unwrap_or(config.default_perpage);
        if let Some(max) = config.max_perpage {
            perpage = perpage.min(max);
        }
        Self::new(page, perpage)
    }

    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.perpage)
    }

    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.perpage)
    }

    /// Offset handed to the store, capped at the largest `bigint`.
    pub fn skip(&self) -> u64 {
        self.start_index().min(MAX_SQL_WINDOW)
    }

    pub fn limit(&self) -> u64 {
        self.perpage.min(MAX_SQL_WINDOW)
    }

    pub fn paginate(&self, total: u64) -> Pagination {
        let mut pagination = Pagination::default();
        if self.end_index() < total {
            pagination.next = Some(PageDescriptor { page: self.page + 1, perpage: self.perpage });
        }
        if self.start_index() > 0 {
            pagination.prev = Some(PageDescriptor { page: self.page - 1, perpage: self.perpage });
        }
        pagination
    }
}

/// Leading integer of the input (`"2.5"` is 2, `"10abc"` is 10); no digits
/// or a value below 1 yields `None`.
fn parse_positive(value: Option<&str>) -> Option<u64> {
    let value = value?.trim_start();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if negative || digits.is_empty() {
        return None;
    }
    let n = digits.parse::<u64>().unwrap_or(MAX_SQL_WINDOW).min(MAX_SQL_WINDOW);
    (n >= 1).then_some(n)
}
