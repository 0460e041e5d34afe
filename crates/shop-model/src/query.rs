//! Product queries and pagination

use crate::record::Product;
use serde::{Deserialize, Serialize};

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Filters and paging for a product listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive text match on name and description
    pub q: Option<String>,
    /// Exact category match
    pub category: Option<String>,
    /// 1-based page number
    pub page: usize,
    /// Page size
    pub limit: usize,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            q: None,
            category: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductQuery {
    /// Create query matching everything
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With text search
    #[inline]
    #[must_use]
    pub fn with_text(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// With category filter
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// With page and page size
    #[inline]
    #[must_use]
    pub fn with_page(mut self, page: usize, limit: usize) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// Whether a product passes the filters
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let text_ok = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()).map_or(true, |q| {
            let needle = q.to_lowercase();
            product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        });
        let category_ok = self
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map_or(true, |c| product.category == c);
        text_ok && category_ok
    }

    /// Filter then paginate
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Page<Product> {
        let matching = products.into_iter().filter(|p| self.matches(p)).collect();
        Page::slice(matching, self.page, self.limit)
    }
}

/// One page of a larger result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Records on this page
    pub data: Vec<T>,
    /// 1-based page number
    pub page: usize,
    /// Page size
    pub limit: usize,
    /// Records across all pages
    pub total: usize,
    /// Number of pages
    pub total_pages: usize,
    /// Whether a later page exists
    pub has_next: bool,
    /// Whether an earlier page exists
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Cut one page out of a full result; page and limit are clamped to 1
    #[must_use]
    pub fn slice(all: Vec<T>, page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total = all.len();
        let total_pages = total.div_ceil(limit);
        let data = all
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Self {
            data,
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}
