//! List filtering and pagination helpers for collection endpoints.
//!
//! Filtering happens in memory over the full active sequence, so the
//! helpers here operate on plain [`Record`] slices.

use serde_json::Value;

use crate::types::Record;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Text fields scanned by the `search` filter.
pub const SEARCH_FIELDS: &[&str] = &["name", "title", "excerpt", "description"];

/// Field compared by the `category` filter.
pub const CATEGORY_FIELD: &str = "category";

/// Category value meaning "no category filter".
pub const CATEGORY_ALL: &str = "all";

/// Maximum number of records returned per page.
pub const MAX_PAGE_LIMIT: usize = 500;

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// In-memory filter applied to a collection listing.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive substring matched against [`SEARCH_FIELDS`].
    pub search: Option<String>,
    /// Case-insensitive exact match on the record's `category`.
    pub category: Option<String>,
}

impl ListFilter {
    pub fn new(search: Option<String>, category: Option<String>) -> Self {
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let category = category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty() && c != CATEGORY_ALL);
        Self { search, category }
    }

    /// Whether the filter has nothing to check.
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.category.is_none()
    }

    /// Check a single record against both filters.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(term) = &self.search {
            let hit = SEARCH_FIELDS.iter().any(|field| {
                text_field(record, field).is_some_and(|text| text.to_lowercase().contains(term))
            });
            if !hit {
                return false;
            }
        }

        if let Some(category) = &self.category {
            match text_field(record, CATEGORY_FIELD) {
                Some(value) if value.to_lowercase() == *category => {}
                _ => return false,
            }
        }

        true
    }

    /// Keep only matching records, preserving order.
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn text_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    match record.get(field) {
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Slice a filtered listing by `offset` and `limit`.
///
/// A missing limit returns everything after the offset; a supplied limit is
/// clamped to `1..=MAX_PAGE_LIMIT`.
pub fn paginate(records: Vec<Record>, limit: Option<usize>, offset: Option<usize>) -> Vec<Record> {
    let offset = offset.unwrap_or(0);
    let iter = records.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit.clamp(1, MAX_PAGE_LIMIT)).collect(),
        None => iter.collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
