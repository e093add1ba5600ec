//! Shared query parameter types for API handlers.

use bizdir_core::search::ListFilter;
use serde::Deserialize;

/// Listing parameters (`?search=&category=&limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListParams {
    pub fn filter(&self) -> ListFilter {
        ListFilter::new(self.search.clone(), self.category.clone())
    }
}
