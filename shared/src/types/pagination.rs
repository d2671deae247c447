//! Pagination related types for list endpoints

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Pagination query parameters (1-indexed pages)
///
/// Out of range values are rejected by [`Validate`], never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageParams {
    /// Current page number (1-indexed)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,

    /// Number of items per page
    #[serde(default = "default_size")]
    #[validate(range(min = 1, max = 100))]
    pub size: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

impl PageParams {
    /// Create validated pagination parameters
    pub fn new(page: u32, size: u32) -> Result<Self, ValidationErrors> {
        let params = Self { page, size };
        params.validate()?;
        Ok(params)
    }

    /// Number of rows to skip: `(page - 1) * size`
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }

    /// Number of rows to fetch
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    /// Check if this is the first page
    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }
}

/// One page of results with the total row count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    /// Items of the current page
    pub items: Vec<T>,

    /// Total number of items matching the query
    pub total: u64,

    /// Current page number
    pub page: u32,

    /// Current page size
    pub size: u32,
}

impl<T> PagedResponse<T> {
    /// Create a paged response echoing the request parameters
    pub fn create(items: Vec<T>, total: u64, params: &PageParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            size: params.size,
        }
    }

    /// Create an empty page
    pub fn empty(params: &PageParams) -> Self {
        Self::create(Vec::new(), 0, params)
    }

    /// Total number of pages for the current size
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }

    /// Whether a page follows this one
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    /// Transform the items using a function
    pub fn map<U, F>(self, f: F) -> PagedResponse<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }

    /// Check if the page is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_SIZE: u32 = 20;

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_size() -> u32 {
    DEFAULT_SIZE
}
